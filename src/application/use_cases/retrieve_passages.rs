use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::application::{EmbeddingService, VectorRepository};
use crate::domain::{is_degenerate, DomainError, RetrievalResult};

pub const DEFAULT_TOP_K: usize = 3;

/// Embeds a query with the index's embedding model and returns the top-k
/// most similar chunks.
pub struct RetrievePassagesUseCase {
    vector_repo: Arc<dyn VectorRepository>,
    embedding_service: Arc<dyn EmbeddingService>,
}

impl RetrievePassagesUseCase {
    pub fn new(
        vector_repo: Arc<dyn VectorRepository>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            vector_repo,
            embedding_service,
        }
    }

    /// An empty collection, a zero `k`, or a query that embeds to the zero
    /// vector all yield an empty result rather than an error.
    pub async fn execute(&self, query: &str, k: usize) -> Result<RetrievalResult, DomainError> {
        info!("Retrieving top {} passages for: {}", k, query);
        let start_time = Instant::now();

        if k == 0 || self.vector_repo.count().await? == 0 {
            warn!(
                "Collection '{}' is empty or k is zero, continuing without context",
                self.vector_repo.collection()
            );
            return Ok(RetrievalResult::empty(query));
        }

        ensure_same_model(self.vector_repo.as_ref(), self.embedding_service.as_ref()).await?;

        let query_embedding = self.embedding_service.embed_query(query).await?;
        if is_degenerate(&query_embedding) {
            warn!("Query embedded to a zero vector, continuing without context");
            return Ok(RetrievalResult::empty(query));
        }

        let passages = self.vector_repo.search(&query_embedding, k).await?;

        info!(
            "Found {} passages in {:.2}s",
            passages.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(RetrievalResult::new(query, passages))
    }
}

/// Fails when the collection holds vectors from any model other than the one
/// the embedding service runs. Scores across models are meaningless.
pub(crate) async fn ensure_same_model(
    vector_repo: &dyn VectorRepository,
    embedding_service: &dyn EmbeddingService,
) -> Result<(), DomainError> {
    let expected = embedding_service.config().model_name();
    let stored = vector_repo.models().await?;
    if let Some(other) = stored.iter().find(|m| m.as_str() != expected) {
        return Err(DomainError::embedding(format!(
            "Collection '{}' was built with model '{}' but the active model is '{}'; \
             rebuild it with `index --reset` or switch embedding models",
            vector_repo.collection(),
            other,
            expected
        )));
    }
    Ok(())
}
