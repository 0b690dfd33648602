pub mod routes;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Full HTTP surface. Any origin may call it (the browser frontend runs on another port).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/test", get(routes::health))
        .route("/api/company/{ticker}", get(routes::get_company))
        .route("/api/company/{ticker}/filings", get(routes::get_company_filings))
        .route("/api/stock/search", post(routes::search_stock))
        .route("/api/stock/{ticker}", get(routes::get_stock))
        .route("/api/blackscholes/callprice", get(routes::call_price))
        .route("/api/blackscholes/putprice", get(routes::put_price))
        .route("/api/blackscholes/heatmap", get(routes::heatmap))
        .route("/api/counters", get(routes::get_counters))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
