use crate::config::AppConfig;
use crate::db::DbPool;
use crate::pricing::black_scholes::BlackScholesEngine;
use crate::quotes::client::QuoteClient;
use crate::sec::client::SecClient;
use crate::sec::directory::CompanyDirectory;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ── Request Counters (lock-free) ──

pub struct RequestCounters {
    pub pricing_requests: AtomicU64,
    pub computation_errors: AtomicU64,
    pub company_lookups: AtomicU64,
    pub quote_requests: AtomicU64,
    pub upstream_errors: AtomicU64,
    pub directory_refreshes: AtomicU64,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self {
            pricing_requests: AtomicU64::new(0),
            computation_errors: AtomicU64::new(0),
            company_lookups: AtomicU64::new(0),
            quote_requests: AtomicU64::new(0),
            upstream_errors: AtomicU64::new(0),
            directory_refreshes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        use portable_atomic::Ordering::Relaxed;
        CountersSnapshot {
            pricing_requests: self.pricing_requests.load(Relaxed),
            computation_errors: self.computation_errors.load(Relaxed),
            company_lookups: self.company_lookups.load(Relaxed),
            quote_requests: self.quote_requests.load(Relaxed),
            upstream_errors: self.upstream_errors.load(Relaxed),
            directory_refreshes: self.directory_refreshes.load(Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CountersSnapshot {
    pub pricing_requests: u64,
    pub computation_errors: u64,
    pub company_lookups: u64,
    pub quote_requests: u64,
    pub upstream_errors: u64,
    pub directory_refreshes: u64,
}

// ── Application shared state ──

/// Everything a handler needs. The pricing engine is stateless, so handlers
/// share one instance without coordination.
pub struct AppState {
    pub config: AppConfig,
    pub engine: BlackScholesEngine,
    pub directory: CompanyDirectory,
    pub quotes: QuoteClient,
    pub counters: RequestCounters,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Arc<Self> {
        let sec = SecClient::new(&config);
        let quotes = QuoteClient::new(&config);

        Arc::new(Self {
            directory: CompanyDirectory::new(db, sec),
            quotes,
            engine: BlackScholesEngine::new(),
            counters: RequestCounters::new(),
            config,
        })
    }
}
