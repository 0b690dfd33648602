pub mod client;
pub mod directory;
pub mod types;
