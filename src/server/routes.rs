use crate::errors::{ServiceError, ServiceResult};
use crate::pricing::heatmap::{heatmap_from_params, HeatMap};
use crate::pricing::{OptionType, PricingParams, PricingRequest, PricingResult};
use crate::quotes::types::StockInfo;
use crate::sec::types::{CompanyProfile, Filing};
use crate::state::{AppState, CountersSnapshot, RequestCounters};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use std::sync::Arc;

const MAX_TICKER_LEN: usize = 10;

#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchRequest {
    pub ticker: Option<String>,
}

/// GET /api/test -- liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Backend is working!",
        "status": "success",
    }))
}

/// GET /api/company/{ticker} -- directory record plus recent filings
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> ServiceResult<Json<CompanyProfile>> {
    RequestCounters::bump(&state.counters.company_lookups);
    let ticker = normalize_ticker(&ticker)?;

    let profile = track(&state, state.directory.profile(&ticker, state.config.filings_limit).await)?;
    profile
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Company {ticker} not found")))
}

/// GET /api/company/{ticker}/filings -- recent filings, empty for unknown tickers
pub async fn get_company_filings(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> ServiceResult<Json<Vec<Filing>>> {
    RequestCounters::bump(&state.counters.company_lookups);
    let ticker = normalize_ticker(&ticker)?;

    let filings = track(&state, state.directory.filings(&ticker, state.config.filings_limit).await)?;
    Ok(Json(filings))
}

/// GET /api/stock/{ticker} -- quote snapshot
pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> ServiceResult<Json<StockInfo>> {
    let ticker = normalize_ticker(&ticker)?;
    stock_info(&state, &ticker).await
}

/// POST /api/stock/search -- same as GET /api/stock/{ticker}, ticker in the JSON body
pub async fn search_stock(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ServiceResult<Json<StockInfo>> {
    // Unparseable bodies are treated like an absent ticker.
    let req: SearchRequest = serde_json::from_slice(&body).unwrap_or_default();
    let raw = req.ticker.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(ServiceError::BadRequest("Ticker is required".into()));
    }
    let ticker = normalize_ticker(&raw)?;
    stock_info(&state, &ticker).await
}

async fn stock_info(state: &Arc<AppState>, ticker: &str) -> ServiceResult<Json<StockInfo>> {
    RequestCounters::bump(&state.counters.quote_requests);
    let info = track(state, state.quotes.stock_info(ticker).await)?;
    Ok(Json(info))
}

/// GET /api/blackscholes/callprice
pub async fn call_price(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PricingParams>,
) -> ServiceResult<Json<serde_json::Value>> {
    price_option(&state, &params, OptionType::Call)
}

/// GET /api/blackscholes/putprice
pub async fn put_price(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PricingParams>,
) -> ServiceResult<Json<serde_json::Value>> {
    price_option(&state, &params, OptionType::Put)
}

fn price_option(
    state: &Arc<AppState>,
    params: &PricingParams,
    option_type: OptionType,
) -> ServiceResult<Json<serde_json::Value>> {
    RequestCounters::bump(&state.counters.pricing_requests);

    let result = PricingRequest::from_params(params, option_type)
        .and_then(|req| state.engine.price(&req))
        .map_err(ServiceError::from);
    let result = track(state, result)?;

    Ok(Json(pricing_body(&result)))
}

/// {"call_price": .., "greeks": {..}, "probabilities": {..}}; `put_price` for puts.
fn pricing_body(result: &PricingResult) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(
        format!("{}_price", result.option_type),
        serde_json::json!(result.price),
    );
    body.insert("greeks".into(), serde_json::json!(result.greeks));
    body.insert("probabilities".into(), serde_json::json!(result.probabilities));
    serde_json::Value::Object(body)
}

/// GET /api/blackscholes/heatmap -- 8x8 spot x volatility grid
pub async fn heatmap(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PricingParams>,
) -> ServiceResult<Json<HeatMap>> {
    RequestCounters::bump(&state.counters.pricing_requests);
    let map = track(&state, heatmap_from_params(&state.engine, &params).map_err(ServiceError::from))?;
    Ok(Json(map))
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<CountersSnapshot> {
    Json(state.counters.snapshot())
}

/// Record failures in the counters and pass the result through.
fn track<T>(state: &AppState, result: ServiceResult<T>) -> ServiceResult<T> {
    if let Err(e) = &result {
        match e {
            ServiceError::Computation(err) => {
                RequestCounters::bump(&state.counters.computation_errors);
                tracing::debug!(error = %err, "pricing request rejected");
            }
            e if e.is_upstream() => {
                RequestCounters::bump(&state.counters.upstream_errors);
                tracing::warn!(error = %e, "upstream request failed");
            }
            _ => {}
        }
    }
    result
}

/// Uppercase and check a ticker before it is used in a lookup or an upstream URL.
pub fn normalize_ticker(raw: &str) -> ServiceResult<String> {
    let ticker = raw.trim().to_uppercase();
    let valid = !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if valid {
        Ok(ticker)
    } else {
        Err(ServiceError::BadRequest(format!("invalid ticker: {raw:?}")))
    }
}
