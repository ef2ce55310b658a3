use async_trait::async_trait;

use crate::domain::{Chunk, DomainError, Embedding, RetrievedPassage};

/// Durable chunk + embedding storage with nearest-neighbour search.
#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Inserts the batch, replacing any chunk that already has the same id.
    async fn save_batch(&self, chunks: &[Chunk], embeddings: &[Embedding])
        -> Result<(), DomainError>;

    /// Returns up to `limit` passages ordered by descending cosine similarity.
    /// An empty collection yields an empty vector.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedPassage>, DomainError>;

    /// Removes every chunk from the collection.
    async fn clear(&self) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;

    /// Distinct embedding model names stored in the collection, sorted.
    async fn models(&self) -> Result<Vec<String>, DomainError>;

    /// Name of the collection this repository reads and writes.
    fn collection(&self) -> &str;
}
