use super::client::SecClient;
use super::types::{Company, CompanyProfile, Filing};
use crate::db::{self, DbPool};
use crate::errors::ServiceResult;
use crate::state::AppState;
use portable_atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Ticker -> company index backed by SQLite, refreshed from the SEC directory.
#[derive(Clone)]
pub struct CompanyDirectory {
    db: DbPool,
    client: SecClient,
    /// Serializes refreshes so a cold start downloads the directory once.
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl CompanyDirectory {
    pub fn new(db: DbPool, client: SecClient) -> Self {
        Self {
            db,
            client,
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Download the directory and replace the stored copy. Returns the number of companies stored.
    pub async fn refresh(&self) -> ServiceResult<usize> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> ServiceResult<usize> {
        let companies = self.client.fetch_company_tickers().await?;
        let now = chrono::Utc::now().to_rfc3339();
        let stored = db::replace_companies(&self.db, &companies, &now)?;
        tracing::info!(companies = stored, "company directory refreshed");
        Ok(stored)
    }

    /// Case-insensitive lookup. An empty store is filled once before answering.
    pub async fn lookup(&self, ticker: &str) -> ServiceResult<Option<Company>> {
        let ticker = ticker.trim().to_uppercase();

        if let Some(company) = db::find_company(&self.db, &ticker)? {
            return Ok(Some(company));
        }

        if db::company_count(&self.db)? > 0 {
            return Ok(None);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another request may have filled the store while we waited.
        if db::company_count(&self.db)? == 0 {
            tracing::info!(ticker = %ticker, "company directory empty, loading before lookup");
            self.refresh_locked().await?;
        }
        db::find_company(&self.db, &ticker)
    }

    /// Recent filings for a ticker; empty if the ticker is unknown.
    pub async fn filings(&self, ticker: &str, limit: usize) -> ServiceResult<Vec<Filing>> {
        match self.lookup(ticker).await? {
            Some(company) => self.client.fetch_recent_filings(company.cik_str, limit).await,
            None => Ok(Vec::new()),
        }
    }

    /// Company record plus recent filings; `None` if the ticker is unknown.
    pub async fn profile(&self, ticker: &str, limit: usize) -> ServiceResult<Option<CompanyProfile>> {
        let Some(company) = self.lookup(ticker).await? else {
            return Ok(None);
        };
        let filings = self.client.fetch_recent_filings(company.cik_str, limit).await?;
        Ok(Some(CompanyProfile { company, filings }))
    }
}

/// Keeps the stored directory current. A store refreshed within the last
/// interval survives a restart; otherwise refresh immediately, then on the
/// configured interval. Failures retry sooner with a growing delay.
pub async fn run_directory_refresher(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.directory_refresh_secs);

    let last = db::last_refreshed_at(&state.directory.db).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read last directory refresh");
        None
    });
    let mut delay = time_until_stale(last.as_deref(), chrono::Utc::now(), interval);
    tracing::info!(
        interval_secs = interval.as_secs(),
        first_refresh_in_secs = delay.as_secs(),
        "company directory refresher started"
    );

    let mut consecutive_errors: u32 = 0;

    loop {
        tokio::time::sleep(delay).await;

        delay = match state.directory.refresh().await {
            Ok(_) => {
                consecutive_errors = 0;
                state.counters.directory_refreshes.fetch_add(1, Ordering::Relaxed);
                interval
            }
            Err(e) => {
                consecutive_errors += 1;
                state.counters.upstream_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    error = %e,
                    consecutive = consecutive_errors,
                    "company directory refresh failed"
                );
                retry_delay(consecutive_errors, interval)
            }
        };
    }
}

/// Time left before a refresh stamped `last_refreshed` goes stale.
/// Zero when there was no refresh or the stamp is unreadable.
fn time_until_stale(
    last_refreshed: Option<&str>,
    now: chrono::DateTime<chrono::Utc>,
    interval: Duration,
) -> Duration {
    let Some(last) = last_refreshed.and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok()) else {
        return Duration::ZERO;
    };
    let age = (now - last.with_timezone(&chrono::Utc)).to_std().unwrap_or(Duration::ZERO);
    interval.saturating_sub(age)
}

/// 30s per consecutive failure, never longer than the regular interval.
fn retry_delay(consecutive_errors: u32, interval: Duration) -> Duration {
    let backoff = Duration::from_secs(30 * u64::from(consecutive_errors.min(60)));
    backoff.min(interval)
}
