mod config;
mod db;
mod errors;
mod pricing;
mod quotes;
mod sec;
mod server;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("stockdesk starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    // Init database
    let db_pool = match db::init_db(&cfg.data_dir) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("database init error: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(cfg.clone(), db_pool);

    // Company directory refresher
    let refresher_state = app_state.clone();
    tokio::spawn(async move {
        sec::directory::run_directory_refresher(refresher_state).await;
    });

    // Axum HTTP server
    let app = server::router(app_state);

    let addr = format!("0.0.0.0:{}", cfg.server_port);
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
