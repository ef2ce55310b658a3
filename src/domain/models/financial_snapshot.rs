use serde::{Deserialize, Serialize};

/// Point-in-time metrics for one ticker. Fields are optional so partially
/// populated snapshots can still be summarized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    ticker: Option<String>,
    sector: Option<String>,
    interest_pct: Option<f64>,
    debt_ratio: Option<f64>,
}

impl FinancialSnapshot {
    pub fn new(sector: impl Into<String>, interest_pct: f64, debt_ratio: Option<f64>) -> Self {
        Self {
            ticker: None,
            sector: Some(sector.into()),
            interest_pct: Some(interest_pct),
            debt_ratio,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_interest_pct(mut self, pct: f64) -> Self {
        self.interest_pct = Some(pct);
        self
    }

    pub fn with_debt_ratio(mut self, ratio: f64) -> Self {
        self.debt_ratio = Some(ratio);
        self
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    /// Interest income as a percentage of revenue.
    pub fn interest_pct(&self) -> Option<f64> {
        self.interest_pct
    }

    /// Trailing-twelve-month debt-to-equity ratio.
    pub fn debt_ratio(&self) -> Option<f64> {
        self.debt_ratio
    }

    /// Metric block handed to the financial interpreter.
    pub fn metrics_block(&self) -> String {
        let mut out = String::new();
        if let Some(ticker) = self.ticker() {
            out.push_str(&format!("ticker: {}\n", ticker));
        }
        out.push_str(&format!("sector: {}\n", self.sector().unwrap_or("N/A")));
        out.push_str(&format!(
            "interest_pct: {}\n",
            self.interest_pct
                .map(format_number)
                .unwrap_or_else(|| "0".to_string())
        ));
        out.push_str(&format!(
            "debt_ratio: {}",
            self.debt_ratio
                .map(format_number)
                .unwrap_or_else(|| "N/A".to_string())
        ));
        out
    }
}

/// Renders a float with its shortest round-trip form, keeping one decimal on
/// integral values (`0.0`, `12.0`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
