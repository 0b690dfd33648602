use crate::errors::{ServiceError, ServiceResult};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub sec_user_agent: String,
    pub sec_tickers_url: String,
    pub sec_submissions_base_url: String,
    pub quote_base_url: String,
    pub filings_limit: usize,
    pub directory_refresh_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> ServiceResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "5001")
            .parse::<u16>()
            .map_err(|e| ServiceError::Config(format!("SERVER_PORT: {e}")))?;

        let filings_limit = env_var_or("FILINGS_LIMIT", "10")
            .parse::<usize>()
            .map_err(|e| ServiceError::Config(format!("FILINGS_LIMIT: {e}")))?;

        let directory_refresh_secs = env_var_or("DIRECTORY_REFRESH_SECS", "86400")
            .parse::<u64>()
            .map_err(|e| ServiceError::Config(format!("DIRECTORY_REFRESH_SECS: {e}")))?;

        if directory_refresh_secs == 0 {
            return Err(ServiceError::Config("DIRECTORY_REFRESH_SECS must be > 0".into()));
        }

        Ok(Self {
            server_port,
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "data")),
            sec_user_agent: env_var_or("SEC_USER_AGENT", "FinanceDataCollector 1.0"),
            sec_tickers_url: env_var_or(
                "SEC_TICKERS_URL",
                "https://www.sec.gov/files/company_tickers.json",
            ),
            sec_submissions_base_url: env_var_or(
                "SEC_SUBMISSIONS_BASE_URL",
                "https://data.sec.gov/submissions",
            ),
            quote_base_url: env_var_or("QUOTE_BASE_URL", "https://query1.finance.yahoo.com"),
            filings_limit,
            directory_refresh_secs,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl AppConfig {
    /// Defaults whose upstream URLs fail immediately without touching the network.
    pub fn test_defaults() -> Self {
        Self {
            server_port: 0,
            data_dir: PathBuf::from("unused"),
            sec_user_agent: "stockdesk-tests".into(),
            sec_tickers_url: "offline://sec/company_tickers.json".into(),
            sec_submissions_base_url: "offline://sec/submissions".into(),
            quote_base_url: "offline://quotes".into(),
            filings_limit: 10,
            directory_refresh_secs: 86_400,
        }
    }
}
