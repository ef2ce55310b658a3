use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::application::MetricSource;
use crate::domain::{DomainError, FinancialSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const MISSING_DATA: &str = "Missing data.";

/// Financial Modeling Prep client. One snapshot takes three GETs: the company
/// profile, the latest income statement and the trailing-twelve-month ratios.
pub struct FmpMetricSource {
    client: reqwest::Client,
    base_url: String,
}

impl FmpMetricSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base.trim_end_matches('/').to_string(),
        }
    }

    /// Reads `FMP_BASE_URL`, falling back to the public v3 API.
    pub fn from_env() -> Self {
        let base = std::env::var("FMP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, DomainError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("FmpMetricSource: GET {}", url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::data_fetch(e.without_url().to_string()))?;
        response
            .json::<Value>()
            .await
            .map_err(|e| DomainError::data_fetch(e.without_url().to_string()))
    }

    /// Derives a snapshot from the three raw responses.
    pub fn snapshot_from(
        ticker: &str,
        profile: &Value,
        income: &Value,
        ratios: &Value,
    ) -> Result<FinancialSnapshot, DomainError> {
        let profile = first_record(profile)?;
        let income = first_record(income)?;
        let ratios = first_record(ratios)?;

        let sector = profile
            .get("sector")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("N/A");

        let interest_income = income.get("interestIncome").and_then(as_number).unwrap_or(0.0);
        let revenue = income.get("revenue").and_then(as_number).unwrap_or(1.0);
        if revenue == 0.0 {
            return Err(DomainError::data_fetch(format!(
                "Reported revenue for {} is zero.",
                ticker
            )));
        }
        let interest_pct = round2(interest_income / revenue * 100.0);
        let debt_ratio = ratios.get("debtEquityRatioTTM").and_then(as_number);

        Ok(FinancialSnapshot::new(sector, interest_pct, debt_ratio).with_ticker(ticker))
    }
}

/// First element of an FMP list response. Empty lists and non-list bodies
/// both mean the provider had nothing usable.
fn first_record(value: &Value) -> Result<&Value, DomainError> {
    match value {
        Value::Array(items) => items.first().ok_or_else(|| DomainError::data_fetch(MISSING_DATA)),
        Value::Object(map) => match map.get("Error Message").and_then(Value::as_str) {
            Some(message) => Err(DomainError::data_fetch(message)),
            None => Err(DomainError::data_fetch(MISSING_DATA)),
        },
        _ => Err(DomainError::data_fetch(MISSING_DATA)),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[async_trait]
impl MetricSource for FmpMetricSource {
    async fn fetch(&self, ticker: &str, api_key: &str) -> Result<FinancialSnapshot, DomainError> {
        let profile = self
            .get_json(&format!("/profile/{}", ticker), &[("apikey", api_key)])
            .await?;
        let income = self
            .get_json(
                &format!("/income-statement/{}", ticker),
                &[("limit", "1"), ("apikey", api_key)],
            )
            .await?;
        let ratios = self
            .get_json(&format!("/ratios-ttm/{}", ticker), &[("apikey", api_key)])
            .await?;

        Self::snapshot_from(ticker, &profile, &income, &ratios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_snapshot_from_responses() {
        let snapshot = FmpMetricSource::snapshot_from(
            "AAPL",
            &json!([{ "sector": "Technology" }]),
            &json!([{ "interestIncome": 2_500_000_000.0, "revenue": 100_000_000_000.0 }]),
            &json!([{ "debtEquityRatioTTM": 1.2 }]),
        )
        .unwrap();

        assert_eq!(snapshot.ticker(), Some("AAPL"));
        assert_eq!(snapshot.sector(), Some("Technology"));
        assert_eq!(snapshot.interest_pct(), Some(2.5));
        assert_eq!(snapshot.debt_ratio(), Some(1.2));
    }

    #[test]
    fn empty_profile_is_missing_data() {
        let err = FmpMetricSource::snapshot_from(
            "ZZZZ",
            &json!([]),
            &json!([{ "revenue": 10.0 }]),
            &json!([{}]),
        )
        .unwrap_err();
        assert!(err.is_data_fetch());
        assert_eq!(err.to_string(), "Missing data.");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let snapshot =
            FmpMetricSource::snapshot_from("X", &json!([{}]), &json!([{}]), &json!([{}])).unwrap();
        assert_eq!(snapshot.sector(), Some("N/A"));
        assert_eq!(snapshot.interest_pct(), Some(0.0));
        assert_eq!(snapshot.debt_ratio(), None);
    }

    #[test]
    fn interest_share_rounds_to_two_places() {
        let snapshot = FmpMetricSource::snapshot_from(
            "X",
            &json!([{ "sector": "Energy" }]),
            &json!([{ "interestIncome": 1.0, "revenue": 3.0 }]),
            &json!([{ "debtEquityRatioTTM": "0.45" }]),
        )
        .unwrap();
        assert_eq!(snapshot.interest_pct(), Some(33.33));
        assert_eq!(snapshot.debt_ratio(), Some(0.45));
    }

    #[test]
    fn zero_revenue_is_rejected() {
        let err = FmpMetricSource::snapshot_from(
            "X",
            &json!([{ "sector": "Energy" }]),
            &json!([{ "interestIncome": 5.0, "revenue": 0 }]),
            &json!([{}]),
        )
        .unwrap_err();
        assert!(err.is_data_fetch());
    }

    #[test]
    fn provider_error_message_is_surfaced() {
        let err = FmpMetricSource::snapshot_from(
            "X",
            &json!({ "Error Message": "Invalid API KEY." }),
            &json!([]),
            &json!([]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid API KEY.");
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_data_fetch_error() {
        let source = FmpMetricSource::new("http://127.0.0.1:9/api/v3");
        let err = source.fetch("AAPL", "secret-key-123").await.unwrap_err();
        assert!(err.is_data_fetch());
        assert!(!err.to_string().contains("secret-key-123"));
        assert!(!err.to_string().contains("apikey"));
    }
}
