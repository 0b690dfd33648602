use super::types::*;
use crate::config::AppConfig;
use crate::errors::{ServiceError, ServiceResult};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;

/// SEC EDGAR REST client. The SEC rejects requests without a descriptive User-Agent.
#[derive(Clone)]
pub struct SecClient {
    client: Client,
    user_agent: String,
    tickers_url: String,
    submissions_base_url: String,
}

impl SecClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .pool_max_idle_per_host(4)
                .build()
                .unwrap_or_default(),
            user_agent: config.sec_user_agent.clone(),
            tickers_url: config.sec_tickers_url.clone(),
            submissions_base_url: config.sec_submissions_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, url: &str) -> ServiceResult<reqwest::Response> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Ok(resp)
    }

    /// Download the full ticker -> CIK directory.
    pub async fn fetch_company_tickers(&self) -> ServiceResult<Vec<Company>> {
        let resp = self.get(&self.tickers_url).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let raw: CompanyTickersResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("company tickers: {e}")))?;

        Ok(companies_in_order(raw))
    }

    /// Most recent filings for a CIK. A non-success status from the SEC
    /// (unknown CIK, throttling) yields an empty list.
    pub async fn fetch_recent_filings(&self, cik: u64, limit: usize) -> ServiceResult<Vec<Filing>> {
        let url = format!("{}/CIK{cik:010}.json", self.submissions_base_url);
        let resp = self.get(&url).await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(cik = cik, status = status.as_u16(), "submissions fetch returned no data");
            return Ok(Vec::new());
        }

        let submissions: SubmissionsResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("submissions CIK{cik:010}: {e}")))?;

        Ok(submissions.recent_filings(limit))
    }
}
