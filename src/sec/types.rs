use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Company directory (company_tickers.json) ──

/// One entry of the SEC ticker directory. Field names match the SEC file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub cik_str: u64,
    pub ticker: String,
    pub title: String,
}

/// The directory is a JSON object keyed by row number: {"0": {...}, "1": {...}}.
pub type CompanyTickersResponse = HashMap<String, Company>;

/// Flatten the directory into file order. Keys that are not row numbers sort last.
pub fn companies_in_order(raw: CompanyTickersResponse) -> Vec<Company> {
    let mut rows: Vec<(u64, Company)> = raw
        .into_iter()
        .map(|(k, c)| (k.parse::<u64>().unwrap_or(u64::MAX), c))
        .collect();
    rows.sort_by_key(|(idx, _)| *idx);
    rows.into_iter().map(|(_, c)| c).collect()
}

// ── Submissions (CIK##########.json) ──

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionsResponse {
    pub filings: Option<SubmissionFilings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionFilings {
    pub recent: Option<RecentFilings>,
}

/// Column-oriented: the i-th filing is the i-th element of every vector.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(default)]
    pub filing_date: Vec<String>,
    #[serde(default)]
    pub accession_number: Vec<String>,
}

impl RecentFilings {
    /// The first `limit` filings, newest first as the SEC orders them.
    pub fn first(&self, limit: usize) -> Vec<Filing> {
        self.form
            .iter()
            .zip(&self.filing_date)
            .zip(&self.accession_number)
            .take(limit)
            .map(|((form, date), accession)| Filing {
                form: form.clone(),
                filing_date: date.clone(),
                accession_number: accession.clone(),
            })
            .collect()
    }
}

impl SubmissionsResponse {
    pub fn recent_filings(&self, limit: usize) -> Vec<Filing> {
        self.filings
            .as_ref()
            .and_then(|f| f.recent.as_ref())
            .map(|r| r.first(limit))
            .unwrap_or_default()
    }
}

/// A single filing as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filing {
    pub form: String,
    pub filing_date: String,
    pub accession_number: String,
}

/// Company plus its recent filings.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyProfile {
    pub company: Company,
    pub filings: Vec<Filing>,
}
