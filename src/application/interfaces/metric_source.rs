use async_trait::async_trait;

use crate::domain::{DomainError, FinancialSnapshot};

/// Supplies the financial metrics for a ticker.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Any transport, parsing or missing-data problem is reported as
    /// [`DomainError::DataFetch`].
    async fn fetch(&self, ticker: &str, api_key: &str) -> Result<FinancialSnapshot, DomainError>;
}
