pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    AnalyzeComplianceUseCase, BuildIndexUseCase, BuildOptions, ChatClient, CollectionStatsUseCase,
    EmbeddingService, MetricSource, RetrievePassagesUseCase, ScreenStockUseCase, TextExtractor,
    VectorRepository,
};

pub use connector::{
    Container, ContainerConfig, DuckdbVectorRepository, FmpMetricSource,
    InMemoryVectorRepository, MockEmbedding, OllamaClient, OrtEmbedding, PdfTextExtractor, Router,
};

pub use domain::{
    chunk_text, format_summary, normalize_text, AnalysisResult, AnalysisState, Chunk, Document,
    DomainError, Embedding, EmbeddingConfig, FinancialSnapshot, RetrievalResult, RetrievedPassage,
};
