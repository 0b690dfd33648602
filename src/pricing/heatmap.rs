use super::black_scholes::BlackScholesEngine;
use super::{round_to, ComputationResult, OptionType, PricingParams, PricingRequest};

pub const GRID_SIZE: usize = 8;

/// Spot axis spans 70%..126% of the quoted price in 8% steps.
const SPOT_START: f64 = 0.70;
const SPOT_STEP: f64 = 0.08;
/// Volatility axis spans 10%..52% in 6-point steps.
const VOL_START: f64 = 0.10;
const VOL_STEP: f64 = 0.06;

/// Call and put prices over a spot x volatility grid.
/// `calls[row][col]` is priced at `volatilities[row]` and `stock_prices[col]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HeatMap {
    pub stock_prices: Vec<f64>,
    pub volatilities: Vec<f64>,
    pub calls: Vec<Vec<f64>>,
    pub puts: Vec<Vec<f64>>,
}

/// Sweep spot and volatility around a quote; strike, expiry and rate stay fixed.
/// Any failing cell fails the whole grid.
pub fn build_heatmap(
    engine: &BlackScholesEngine,
    stock_price: f64,
    strike: f64,
    time_to_expiry: f64,
    risk_free_rate: f64,
) -> ComputationResult<HeatMap> {
    let spots: Vec<f64> = (0..GRID_SIZE)
        .map(|i| stock_price * (SPOT_START + SPOT_STEP * i as f64))
        .collect();
    let vols: Vec<f64> = (0..GRID_SIZE)
        .map(|j| VOL_START + VOL_STEP * j as f64)
        .collect();

    let mut calls = Vec::with_capacity(GRID_SIZE);
    let mut puts = Vec::with_capacity(GRID_SIZE);

    for &sigma in &vols {
        let mut call_row = Vec::with_capacity(GRID_SIZE);
        let mut put_row = Vec::with_capacity(GRID_SIZE);
        for &spot in &spots {
            let req = PricingRequest::new(spot, strike, time_to_expiry, risk_free_rate, sigma, OptionType::Call)?;
            call_row.push(engine.call(&req)?.price);
            put_row.push(engine.put(&req)?.price);
        }
        calls.push(call_row);
        puts.push(put_row);
    }

    Ok(HeatMap {
        stock_prices: spots.iter().map(|s| s.round()).collect(),
        volatilities: vols.iter().map(|v| round_to(*v, 2)).collect(),
        calls,
        puts,
    })
}

/// Heat map from transport parameters. `volatility` is not required since it is swept.
pub fn heatmap_from_params(engine: &BlackScholesEngine, params: &PricingParams) -> ComputationResult<HeatMap> {
    // Reuse the single-option parser with a placeholder volatility.
    let with_vol = PricingParams {
        volatility: Some(VOL_START.to_string()),
        ..params.clone()
    };
    let base = PricingRequest::from_params(&with_vol, OptionType::Call)?;
    build_heatmap(engine, base.spot, base.strike, base.time_to_expiry, base.risk_free_rate)
}
