use std::sync::Arc;

use tracing::info;

use crate::application::MetricSource;
use crate::domain::{format_summary, AnalysisResult, DomainError, FinancialSnapshot, RetrievalResult};

use super::{AnalyzeComplianceUseCase, RetrievePassagesUseCase};

/// Everything produced for one screening request.
#[derive(Debug, Clone)]
pub struct ScreeningReport {
    pub snapshot: FinancialSnapshot,
    pub summary: String,
    pub retrieval: RetrievalResult,
    pub analysis: AnalysisResult,
}

/// Query-time pipeline: fetch metrics -> summarize -> retrieve -> two-stage
/// generation. Steps run strictly in sequence.
pub struct ScreenStockUseCase {
    metric_source: Arc<dyn MetricSource>,
    retrieve: RetrievePassagesUseCase,
    analyze: AnalyzeComplianceUseCase,
}

impl ScreenStockUseCase {
    pub fn new(
        metric_source: Arc<dyn MetricSource>,
        retrieve: RetrievePassagesUseCase,
        analyze: AnalyzeComplianceUseCase,
    ) -> Self {
        Self {
            metric_source,
            retrieve,
            analyze,
        }
    }

    pub async fn execute(
        &self,
        ticker: &str,
        api_key: &str,
        k: usize,
    ) -> Result<ScreeningReport, DomainError> {
        let ticker = ticker.trim().to_uppercase();
        let api_key = api_key.trim();
        if ticker.is_empty() || api_key.is_empty() {
            return Err(DomainError::invalid_input(
                "Please enter both your API key and a valid stock ticker.",
            ));
        }

        info!("Screening {}", ticker);
        let snapshot = self.metric_source.fetch(&ticker, api_key).await?;

        let summary = format_summary(&snapshot);
        let retrieval = self.retrieve.execute(&summary, k).await?;
        let analysis = self.analyze.execute(&snapshot, &retrieval).await?;

        Ok(ScreeningReport {
            snapshot,
            summary,
            retrieval,
            analysis,
        })
    }
}
