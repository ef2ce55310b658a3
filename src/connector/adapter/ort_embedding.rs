use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use crate::application::EmbeddingService;
use crate::domain::{Chunk, DomainError, Embedding, EmbeddingConfig};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_DIMENSIONS: usize = 384;
const DEFAULT_MAX_SEQ_LENGTH: usize = 256;
const BATCH_SIZE: usize = 32;

/// Sentence-transformer embeddings run through ONNX Runtime, mean pooled over
/// the attention mask and L2 normalized.
pub struct OrtEmbedding {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    config: EmbeddingConfig,
}

impl OrtEmbedding {
    /// Downloads (or reuses the cached) model and tokenizer from the
    /// Hugging Face hub.
    pub fn new(model_id: Option<&str>) -> Result<Self, DomainError> {
        let model_id = model_id.unwrap_or(DEFAULT_MODEL_ID);
        info!("Initializing ORT embedding service with model: {}", model_id);

        let api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(true)
            .build()
            .map_err(|e| DomainError::embedding(format!("Failed to create HF API: {}", e)))?;
        let repo = api.model(model_id.to_string());

        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| DomainError::embedding(format!("Failed to download tokenizer: {}", e)))?;
        let model_path = repo
            .get("model.onnx")
            .or_else(|_| repo.get("onnx/model.onnx"))
            .map_err(|e| DomainError::embedding(format!("Failed to download ONNX model: {}", e)))?;

        Self::from_paths(model_path, tokenizer_path, model_id)
    }

    pub fn from_paths(
        model_path: PathBuf,
        tokenizer_path: PathBuf,
        model_name: &str,
    ) -> Result<Self, DomainError> {
        info!("Loading ONNX model from: {:?}", model_path);

        let session = Session::builder()
            .map_err(|e| DomainError::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DomainError::embedding(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| DomainError::embedding(format!("Failed to load ONNX model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| DomainError::embedding(format!("Failed to load tokenizer: {}", e)))?;

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            config: EmbeddingConfig::new(
                model_name.to_string(),
                DEFAULT_DIMENSIONS,
                DEFAULT_MAX_SEQ_LENGTH,
            ),
        })
    }

    fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| DomainError::embedding(format!("Tokenization failed: {}", e)))?;

        let batch_size = encodings.len();
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.config.max_sequence_length());

        let shape = [batch_size, seq_len];
        let input_ids = Tensor::from_array((shape, padded(&encodings, seq_len, Encoding::get_ids)))
            .map_err(|e| DomainError::embedding(format!("Failed to build input_ids: {}", e)))?;
        let attention_mask = Tensor::from_array((
            shape,
            padded(&encodings, seq_len, Encoding::get_attention_mask),
        ))
        .map_err(|e| DomainError::embedding(format!("Failed to build attention_mask: {}", e)))?;
        let token_type_ids = Tensor::from_array((
            shape,
            padded(&encodings, seq_len, Encoding::get_type_ids),
        ))
        .map_err(|e| DomainError::embedding(format!("Failed to build token_type_ids: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to lock session: {}", e)))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids,
            ])
            .map_err(|e| DomainError::embedding(format!("Inference failed: {}", e)))?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No output tensor found"))?;
        let (out_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DomainError::embedding(format!("Failed to extract output tensor: {}", e)))?;
        let out_shape: Vec<usize> = out_shape.iter().map(|&x| x as usize).collect();
        debug!("Output tensor shape: {:?}", out_shape);

        match out_shape.as_slice() {
            // Token embeddings: pool over the unmasked positions.
            [_, tokens, hidden] => Ok((0..batch_size)
                .map(|i| {
                    let offset = i * tokens * hidden;
                    let rows = &data[offset..offset + tokens * hidden];
                    let mut pooled = mean_pool(rows, encodings[i].get_attention_mask(), *tokens, *hidden);
                    l2_normalize(&mut pooled);
                    pooled
                })
                .collect()),
            // Already pooled sentence embeddings.
            [_, hidden] => Ok((0..batch_size)
                .map(|i| {
                    let mut vector = data[i * hidden..(i + 1) * hidden].to_vec();
                    l2_normalize(&mut vector);
                    vector
                })
                .collect()),
            other => Err(DomainError::embedding(format!(
                "Unexpected output tensor shape: {:?}",
                other
            ))),
        }
    }
}

/// Flattens one tokenizer field across the batch, truncated or zero padded to
/// `seq_len`.
fn padded(encodings: &[Encoding], seq_len: usize, field: fn(&Encoding) -> &[u32]) -> Vec<i64> {
    let mut out = Vec::with_capacity(encodings.len() * seq_len);
    for encoding in encodings {
        let values = field(encoding);
        let len = values.len().min(seq_len);
        out.extend(values[..len].iter().map(|&v| v as i64));
        out.extend(std::iter::repeat_n(0i64, seq_len - len));
    }
    out
}

fn mean_pool(rows: &[f32], mask: &[u32], tokens: usize, hidden: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden];
    let mut count = 0.0f32;
    for (t, &m) in mask.iter().enumerate().take(tokens) {
        if m == 0 {
            continue;
        }
        let row = &rows[t * hidden..(t + 1) * hidden];
        for (acc, v) in pooled.iter_mut().zip(row) {
            *acc += v;
        }
        count += 1.0;
    }
    if count > 0.0 {
        for v in &mut pooled {
            *v /= count;
        }
    }
    pooled
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[async_trait]
impl EmbeddingService for OrtEmbedding {
    async fn embed_chunk(&self, chunk: &Chunk) -> Result<Embedding, DomainError> {
        let vector = self
            .embed_texts(&[chunk.content()])?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding(format!("No embedding for chunk {}", chunk.id())))?;

        Ok(Embedding::new(
            chunk.id().to_string(),
            vector,
            self.config.model_name().to_string(),
        ))
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>, DomainError> {
        let mut all_embeddings = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|c| c.content()).collect();
            let vectors = self.embed_texts(&texts)?;

            all_embeddings.extend(batch.iter().zip(vectors).map(|(chunk, vector)| {
                Embedding::new(
                    chunk.id().to_string(),
                    vector,
                    self.config.model_name().to_string(),
                )
            }));
        }

        Ok(all_embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        self.embed_texts(&[query])?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("Failed to generate query embedding"))
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pool_ignores_masked_tokens() {
        let rows = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&rows, &[1, 1, 0], 3, 2);
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn l2_normalize_leaves_zero_vector_alone() {
        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);

        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    #[ignore = "Requires model download"]
    async fn test_ort_embedding_service() {
        let service = OrtEmbedding::new(None).expect("Failed to create service");

        let embedding = service
            .embed_query("Sector: Technology. Debt-to-equity ratio is 1.2.")
            .await
            .unwrap();

        assert_eq!(embedding.len(), DEFAULT_DIMENSIONS);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }
}
