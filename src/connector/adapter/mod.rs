mod duckdb_vector_repository;
mod fmp_metric_source;
mod in_memory_vector_repository;
mod mock_embedding;
mod ollama_client;
mod ort_embedding;
mod pdf_text_extractor;

pub use duckdb_vector_repository::*;
pub use fmp_metric_source::{FmpMetricSource, DEFAULT_BASE_URL as FMP_DEFAULT_BASE_URL};
pub use in_memory_vector_repository::*;
pub use mock_embedding::*;
pub use ollama_client::{OllamaClient, DEFAULT_BASE_URL as OLLAMA_DEFAULT_BASE_URL};
pub use ort_embedding::*;
pub use pdf_text_extractor::*;
