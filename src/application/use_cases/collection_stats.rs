use std::sync::Arc;

use crate::application::VectorRepository;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct CollectionStats {
    pub collection: String,
    pub chunk_count: u64,
}

pub struct CollectionStatsUseCase {
    vector_repo: Arc<dyn VectorRepository>,
}

impl CollectionStatsUseCase {
    pub fn new(vector_repo: Arc<dyn VectorRepository>) -> Self {
        Self { vector_repo }
    }

    pub async fn execute(&self) -> Result<CollectionStats, DomainError> {
        Ok(CollectionStats {
            collection: self.vector_repo.collection().to_string(),
            chunk_count: self.vector_repo.count().await?,
        })
    }
}
