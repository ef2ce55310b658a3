use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::application::EmbeddingService;
use crate::domain::{Chunk, DomainError, Embedding, EmbeddingConfig};

const MODEL_NAME: &str = "mock-embedding";

/// Offline stand-in for a sentence transformer: a bag of words where every
/// lowercase token maps to a fixed pseudo-random direction. Texts sharing
/// vocabulary score higher; identical texts score 1.0.
pub struct MockEmbedding {
    config: EmbeddingConfig,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self::with_dimensions(384)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            config: EmbeddingConfig::new(MODEL_NAME.to_string(), dimensions, 512),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let dimensions = self.config.dimensions();
        let mut vector = vec![0.0f32; dimensions];

        for token in tokens(text) {
            let mut rng = StdRng::seed_from_u64(token_seed(&token));
            for value in vector.iter_mut() {
                *value += rng.gen_range(-1.0f32..1.0);
            }
        }

        // Text without any word characters stays the zero vector.
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn token_seed(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

#[async_trait]
impl EmbeddingService for MockEmbedding {
    async fn embed_chunk(&self, chunk: &Chunk) -> Result<Embedding, DomainError> {
        Ok(Embedding::new(
            chunk.id().to_string(),
            self.embed_text(chunk.content()),
            MODEL_NAME.to_string(),
        ))
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>, DomainError> {
        let embeddings: Vec<Embedding> = chunks
            .iter()
            .map(|chunk| {
                Embedding::new(
                    chunk.id().to_string(),
                    self.embed_text(chunk.content()),
                    MODEL_NAME.to_string(),
                )
            })
            .collect();
        debug!("Embedded {} chunks with the bag-of-words model", embeddings.len());
        Ok(embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.embed_text(query))
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}
