use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::application::{
    AnalyzeComplianceUseCase, BuildIndexUseCase, ChatClient, CollectionStatsUseCase,
    EmbeddingService, MetricSource, RetrievePassagesUseCase, ScreenStockUseCase, TextExtractor,
    VectorRepository,
};
use crate::connector::adapter::{
    DuckdbVectorRepository, FmpMetricSource, MockEmbedding, OllamaClient, OrtEmbedding,
    PdfTextExtractor,
};

pub const DATABASE_FILE: &str = "shariah.duckdb";

pub struct ContainerConfig {
    pub data_dir: String,
    pub collection: String,
    pub mock_embeddings: bool,
}

/// Owns the adapters for one CLI invocation and hands out use cases wired to
/// them.
pub struct Container {
    embedding_service: Arc<dyn EmbeddingService>,
    vector_repo: Arc<dyn VectorRepository>,
    extractor: Arc<dyn TextExtractor>,
    chat_client: Arc<dyn ChatClient>,
    metric_source: Arc<dyn MetricSource>,
    config: ContainerConfig,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let db_path = PathBuf::from(&config.data_dir).join(DATABASE_FILE);

        let embedding_service: Arc<dyn EmbeddingService> = if config.mock_embeddings {
            debug!("Using mock embedding service");
            Arc::new(MockEmbedding::new())
        } else {
            debug!("Initializing ONNX embedding service...");
            Arc::new(OrtEmbedding::new(None)?)
        };

        let vector_repo = Arc::new(DuckdbVectorRepository::new_with_collection(
            &db_path,
            &config.collection,
        )?);
        debug!(
            "Using DuckDB collection {} at {}",
            vector_repo.collection(),
            db_path.display()
        );

        let chat_client = OllamaClient::from_env();
        debug!(
            "Generation backend: {} at {}",
            chat_client.model_name(),
            chat_client.base_url()
        );

        Ok(Self {
            embedding_service,
            vector_repo,
            extractor: Arc::new(PdfTextExtractor::new()),
            chat_client: Arc::new(chat_client),
            metric_source: Arc::new(FmpMetricSource::from_env()),
            config,
        })
    }

    /// Builds a container around caller-supplied adapters.
    pub fn with_services(
        config: ContainerConfig,
        embedding_service: Arc<dyn EmbeddingService>,
        vector_repo: Arc<dyn VectorRepository>,
        extractor: Arc<dyn TextExtractor>,
        chat_client: Arc<dyn ChatClient>,
        metric_source: Arc<dyn MetricSource>,
    ) -> Self {
        Self {
            embedding_service,
            vector_repo,
            extractor,
            chat_client,
            metric_source,
            config,
        }
    }

    pub fn build_index_use_case(&self) -> BuildIndexUseCase {
        BuildIndexUseCase::new(
            Arc::clone(&self.extractor),
            Arc::clone(&self.embedding_service),
            Arc::clone(&self.vector_repo),
        )
    }

    pub fn retrieve_use_case(&self) -> RetrievePassagesUseCase {
        RetrievePassagesUseCase::new(
            Arc::clone(&self.vector_repo),
            Arc::clone(&self.embedding_service),
        )
    }

    pub fn analyze_use_case(&self) -> AnalyzeComplianceUseCase {
        AnalyzeComplianceUseCase::new(Arc::clone(&self.chat_client))
    }

    pub fn screen_use_case(&self) -> ScreenStockUseCase {
        ScreenStockUseCase::new(
            Arc::clone(&self.metric_source),
            self.retrieve_use_case(),
            self.analyze_use_case(),
        )
    }

    pub fn stats_use_case(&self) -> CollectionStatsUseCase {
        CollectionStatsUseCase::new(Arc::clone(&self.vector_repo))
    }

    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }
}
