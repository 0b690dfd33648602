use super::types::*;
use crate::config::AppConfig;
use crate::errors::{ServiceError, ServiceResult};
use reqwest::{Client, StatusCode};

const SUMMARY_MODULES: &str = "price,summaryDetail,assetProfile,financialData";

/// Quote snapshot client (quoteSummary REST API). All methods return Result, never panic.
#[derive(Clone)]
pub struct QuoteClient {
    client: Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .user_agent("Mozilla/5.0 (compatible; stockdesk/0.1)")
                .build()
                .unwrap_or_default(),
            base_url: config.quote_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn stock_info(&self, ticker: &str) -> ServiceResult<StockInfo> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{ticker}?modules={SUMMARY_MODULES}",
            self.base_url
        );

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(format!("no quote data for {ticker}")));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let data: QuoteSummaryResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("quote {ticker}: {e}")))?;

        if let Some(err) = data.quote_summary.error {
            let reason = err
                .description
                .or(err.code)
                .unwrap_or_else(|| "unknown error".into());
            return Err(ServiceError::NotFound(format!("no quote data for {ticker}: {reason}")));
        }

        let result = data
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ServiceError::NotFound(format!("no quote data for {ticker}")))?;

        Ok(StockInfo::from_summary(ticker, &result))
    }
}
