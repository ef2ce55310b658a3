use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::VectorRepository;
use crate::domain::{Chunk, DomainError, Embedding, RetrievedPassage};

struct Entry {
    chunk: Chunk,
    embedding: Embedding,
}

/// Process-local collection. Entries keep insertion order; saving an existing
/// id replaces it in place.
pub struct InMemoryVectorRepository {
    collection: String,
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl InMemoryVectorRepository {
    pub fn new() -> Self {
        Self::with_collection("shariah_texts")
    }

    pub fn with_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Chunk ids in insertion order.
    pub async fn ids(&self) -> Vec<String> {
        let entries = self.entries.lock().await;
        entries.iter().map(|e| e.chunk.id().to_string()).collect()
    }
}

impl Default for InMemoryVectorRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorRepository for InMemoryVectorRepository {
    async fn save_batch(
        &self,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError> {
        if chunks.len() != embeddings.len() {
            return Err(DomainError::invalid_input(
                "Chunk and embedding count mismatch".to_string(),
            ));
        }

        let mut entries = self.entries.lock().await;
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let entry = Entry {
                chunk: chunk.clone(),
                embedding: embedding.clone(),
            };
            match entries.iter_mut().find(|e| e.chunk.id() == chunk.id()) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }

        debug!(
            "Saved {} chunks to in-memory collection {}",
            chunks.len(),
            self.collection
        );
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedPassage>, DomainError> {
        let entries = self.entries.lock().await;
        let mut scored: Vec<RetrievedPassage> = entries
            .iter()
            .map(|e| {
                RetrievedPassage::new(
                    e.chunk.clone(),
                    cosine_similarity(query_embedding, e.embedding.vector()),
                )
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries.lock().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.entries.lock().await.len() as u64)
    }

    async fn models(&self) -> Result<Vec<String>, DomainError> {
        let entries = self.entries.lock().await;
        let mut models: Vec<String> = entries
            .iter()
            .map(|e| e.embedding.model().to_string())
            .collect();
        models.sort();
        models.dedup();
        Ok(models)
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
