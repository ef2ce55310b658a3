mod chat_client;
mod embedding_service;
mod metric_source;
mod text_extractor;
mod vector_repository;

pub use chat_client::*;
pub use embedding_service::*;
pub use metric_source::*;
pub use text_extractor::*;
pub use vector_repository::*;
