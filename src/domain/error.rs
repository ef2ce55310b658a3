use thiserror::Error;

use super::AnalysisState;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The metric source could not be reached or returned unusable data.
    #[error("{0}")]
    DataFetch(String),

    /// A generation stage failed; no partial analysis is ever returned.
    #[error("Generation failed during {stage}: {message}")]
    Generation {
        stage: AnalysisState,
        message: String,
    },

    /// An outbound HTTP call failed or returned an unusable body.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn data_fetch(msg: impl Into<String>) -> Self {
        Self::DataFetch(msg.into())
    }

    pub fn generation(stage: AnalysisState, msg: impl Into<String>) -> Self {
        Self::Generation {
            stage,
            message: msg.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_data_fetch(&self) -> bool {
        matches!(self, Self::DataFetch(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    /// Errors that abort an offline index build.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::Extraction(_) | Self::EmbeddingError(_) | Self::StorageError(_) | Self::IoError(_)
        )
    }
}
