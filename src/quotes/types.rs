use serde::{Deserialize, Serialize, Serializer};

pub const NOT_AVAILABLE: &str = "N/A";
const DESCRIPTION_CHARS: usize = 500;

// ── Upstream quoteSummary response ──
//
// {
//   "quoteSummary": {
//     "result": [{
//       "price": {"longName": "Apple Inc.", "regularMarketPrice": {"raw": 227.5, "fmt": "227.50"}, ...},
//       "summaryDetail": {"trailingPE": {"raw": 34.1}, "dividendYield": {"raw": 0.0044}, ...},
//       "assetProfile": {"sector": "Technology", "industry": "Consumer Electronics", ...},
//       "financialData": {"currentPrice": {"raw": 227.5}}
//     }],
//     "error": null
//   }
// }

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummary {
    pub result: Option<Vec<QuoteSummaryResult>>,
    pub error: Option<QuoteSummaryError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    pub price: Option<PriceModule>,
    pub summary_detail: Option<SummaryDetail>,
    pub asset_profile: Option<AssetProfile>,
    pub financial_data: Option<FinancialData>,
}

/// Numeric fields arrive as {"raw": 1.0, "fmt": "1.00"}, or {} when absent.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub regular_market_price: Option<RawValue>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawValue>,
    pub dividend_yield: Option<RawValue>,
    pub fifty_two_week_high: Option<RawValue>,
    pub fifty_two_week_low: Option<RawValue>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfile {
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub long_business_summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    pub current_price: Option<RawValue>,
}

#[inline]
fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.as_ref().and_then(|r| r.raw)
}

// ── Snapshot returned to API callers ──

/// Company snapshot. Missing values serialize as "N/A".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    #[serde(serialize_with = "na_if_missing")]
    pub current_price: Option<f64>,
    pub market_cap: String,
    #[serde(serialize_with = "na_if_missing")]
    pub pe_ratio: Option<f64>,
    #[serde(serialize_with = "na_if_missing")]
    pub dividend_yield: Option<f64>,
    #[serde(serialize_with = "na_if_missing")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(serialize_with = "na_if_missing")]
    pub fifty_two_week_low: Option<f64>,
    pub description: String,
}

impl StockInfo {
    pub fn from_summary(ticker: &str, summary: &QuoteSummaryResult) -> Self {
        let price = summary.price.clone().unwrap_or_default();
        let detail = summary.summary_detail.clone().unwrap_or_default();
        let profile = summary.asset_profile.clone().unwrap_or_default();
        let financial = summary.financial_data.clone().unwrap_or_default();

        let market_cap = raw(&price.market_cap).or_else(|| raw(&detail.market_cap));

        Self {
            ticker: ticker.to_string(),
            name: price
                .long_name
                .or(price.short_name)
                .unwrap_or_else(|| NOT_AVAILABLE.into()),
            sector: profile.sector.unwrap_or_else(|| NOT_AVAILABLE.into()),
            industry: profile.industry.unwrap_or_else(|| NOT_AVAILABLE.into()),
            current_price: raw(&financial.current_price).or_else(|| raw(&price.regular_market_price)),
            market_cap: market_cap.map(format_market_cap).unwrap_or_else(|| NOT_AVAILABLE.into()),
            pe_ratio: raw(&detail.trailing_pe),
            dividend_yield: raw(&detail.dividend_yield),
            fifty_two_week_high: raw(&detail.fifty_two_week_high),
            fifty_two_week_low: raw(&detail.fifty_two_week_low),
            description: summarize_description(profile.long_business_summary.as_deref()),
        }
    }
}

fn na_if_missing<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_f64(*v),
        None => s.serialize_str(NOT_AVAILABLE),
    }
}

/// $2.50T, $310.00B, $45.60M, or $999,999.99 below a million.
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1e12 {
        format!("${:.2}T", market_cap / 1e12)
    } else if market_cap >= 1e9 {
        format!("${:.2}B", market_cap / 1e9)
    } else if market_cap >= 1e6 {
        format!("${:.2}M", market_cap / 1e6)
    } else {
        format!("${}", with_thousands(market_cap))
    }
}

/// Two decimals with comma-grouped integer digits.
fn with_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// First 500 characters followed by "...".
pub fn summarize_description(summary: Option<&str>) -> String {
    match summary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => {
            let head: String = text.chars().take(DESCRIPTION_CHARS).collect();
            format!("{head}...")
        }
        None => NOT_AVAILABLE.into(),
    }
}
