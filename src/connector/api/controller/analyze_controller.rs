use anyhow::Result;

use crate::application::ScreeningReport;
use crate::domain::{format_number, DomainError};

use super::super::Container;

const RULE: &str = "--------------------------------------------------";

pub struct AnalyzeController<'a> {
    container: &'a Container,
}

impl<'a> AnalyzeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Falls back to `FMP_API_KEY` when no key is given. Input and data
    /// problems are reported as output; generation failures propagate.
    pub async fn analyze(&self, ticker: String, api_key: Option<String>, k: usize) -> Result<String> {
        let api_key = api_key
            .or_else(|| std::env::var("FMP_API_KEY").ok())
            .unwrap_or_default();

        let use_case = self.container.screen_use_case();
        match use_case.execute(&ticker, &api_key, k).await {
            Ok(report) => Ok(format_report(&report)),
            Err(DomainError::InvalidInput(message)) => Ok(message),
            Err(e @ DomainError::DataFetch(_)) => Ok(format!("Error: {}", e)),
            Err(e) => Err(e.into()),
        }
    }
}

fn format_report(report: &ScreeningReport) -> String {
    let snapshot = &report.snapshot;
    let ticker = snapshot.ticker().unwrap_or("N/A");

    let mut output = format!("Financial Snapshot: {}\n{}\n", ticker, RULE);
    output.push_str(&format!("Sector:            {}\n", snapshot.sector().unwrap_or("N/A")));
    output.push_str(&format!(
        "Interest income:   {}% of revenue\n",
        snapshot.interest_pct().map(format_number).unwrap_or_else(|| "0".to_string())
    ));
    output.push_str(&format!(
        "Debt-to-equity:    {}\n\n",
        snapshot.debt_ratio().map(format_number).unwrap_or_else(|| "N/A".to_string())
    ));

    output.push_str("Islamic Context Retrieved:\n");
    if report.retrieval.is_empty() {
        output.push_str("(no passages retrieved)\n");
    } else {
        output.push_str(&report.retrieval.context());
        output.push('\n');
    }
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str("Financial Interpretation\n");
    output.push_str(report.analysis.interpretation());
    output.push_str("\n\n");

    output.push_str("Islamic Finance Assessment\n");
    output.push_str(report.analysis.assessment());

    output
}
