use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::application::{EmbeddingService, TextExtractor, VectorRepository};
use crate::domain::{chunk_text, Chunk, DomainError, DEFAULT_MAX_CHUNK_LENGTH};

use super::retrieve_passages::ensure_same_model;

const EMBED_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub max_length: usize,
    /// Empty the collection before writing. Without it, positional ids from
    /// this run overwrite earlier ones and any longer tail stays in place.
    pub reset: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_CHUNK_LENGTH,
            reset: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexReport {
    pub collection: String,
    pub source: String,
    pub chunk_count: u64,
    pub collection_size: u64,
    pub elapsed: Duration,
}

/// Offline pipeline: extract -> chunk -> embed -> upsert.
pub struct BuildIndexUseCase {
    extractor: Arc<dyn TextExtractor>,
    embedding_service: Arc<dyn EmbeddingService>,
    vector_repo: Arc<dyn VectorRepository>,
}

impl BuildIndexUseCase {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedding_service: Arc<dyn EmbeddingService>,
        vector_repo: Arc<dyn VectorRepository>,
    ) -> Self {
        Self {
            extractor,
            embedding_service,
            vector_repo,
        }
    }

    pub async fn execute(&self, path: &Path, options: &BuildOptions) -> Result<IndexReport, DomainError> {
        if options.max_length == 0 {
            return Err(DomainError::invalid_input("max chunk length must be positive"));
        }

        let start_time = Instant::now();
        info!(
            "Building collection '{}' from {}",
            self.vector_repo.collection(),
            path.display()
        );

        if !options.reset {
            ensure_same_model(self.vector_repo.as_ref(), self.embedding_service.as_ref()).await?;
        }

        let document = self.extractor.extract(path).await?;
        info!("Extracted {} characters from {}", document.len(), document.source());

        let chunks: Vec<Chunk> = chunk_text(document.text(), options.max_length)
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk::new(i as u64, content, document.source()))
            .collect();
        info!("Split document into {} chunks", chunks.len());

        let embeddings = self.embed_all(&chunks).await?;

        if options.reset {
            info!("Clearing collection '{}' before rebuild", self.vector_repo.collection());
            self.vector_repo.clear().await?;
        }

        self.vector_repo.save_batch(&chunks, &embeddings).await?;

        let collection_size = self.vector_repo.count().await?;
        let elapsed = start_time.elapsed();
        info!(
            "Indexing complete: {} chunks written, {} in collection, {:.2}s",
            chunks.len(),
            collection_size,
            elapsed.as_secs_f64()
        );

        Ok(IndexReport {
            collection: self.vector_repo.collection().to_string(),
            source: document.source().to_string(),
            chunk_count: chunks.len() as u64,
            collection_size,
            elapsed,
        })
    }

    async fn embed_all(&self, chunks: &[Chunk]) -> Result<Vec<crate::domain::Embedding>, DomainError> {
        let progress_bar = ProgressBar::new(chunks.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress_bar.set_message("embedding");

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let batch_embeddings = self.embedding_service.embed_chunks(batch).await?;
            if batch_embeddings.len() != batch.len() {
                progress_bar.abandon();
                return Err(DomainError::embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    batch_embeddings.len()
                )));
            }
            embeddings.extend(batch_embeddings);
            progress_bar.inc(batch.len() as u64);
            debug!("Embedded {}/{} chunks", embeddings.len(), chunks.len());
        }

        progress_bar.finish_with_message("done");
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use async_trait::async_trait;

    use super::*;
    use crate::connector::{InMemoryVectorRepository, MockEmbedding};
    use crate::domain::{normalize_text, Document, Embedding};

    struct StaticExtractor {
        text: Option<String>,
    }

    #[async_trait]
    impl TextExtractor for StaticExtractor {
        async fn extract(&self, path: &Path) -> Result<Document, DomainError> {
            match &self.text {
                Some(text) => Ok(Document::new(path.display().to_string(), normalize_text(text))),
                None => Err(DomainError::extraction(format!(
                    "cannot open {}",
                    path.display()
                ))),
            }
        }
    }

    const TEXT: &str = "Trading shares of lawful companies is permitted. \
        Shares of banks that deal in riba are not permitted. \
        Debt should not exceed a third of total assets. \
        Impure income must be purified through charity.";

    fn use_case(text: Option<&str>, repo: Arc<InMemoryVectorRepository>) -> BuildIndexUseCase {
        BuildIndexUseCase::new(
            Arc::new(StaticExtractor {
                text: text.map(String::from),
            }),
            Arc::new(MockEmbedding::new()),
            repo,
        )
    }

    #[tokio::test]
    async fn indexes_every_chunk_with_positional_ids() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let options = BuildOptions {
            max_length: 60,
            reset: false,
        };

        let report = use_case(Some(TEXT), repo.clone())
            .execute(&PathBuf::from("fiqh.pdf"), &options)
            .await
            .unwrap();

        assert_eq!(report.chunk_count, 4);
        assert_eq!(report.collection_size, 4);
        assert_eq!(report.source, "fiqh.pdf");
        let ids = repo.ids().await;
        assert_eq!(ids, vec!["doc_0", "doc_1", "doc_2", "doc_3"]);
    }

    #[tokio::test]
    async fn rebuilding_the_same_document_overwrites_ids() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let uc = use_case(Some(TEXT), repo.clone());
        let options = BuildOptions {
            max_length: 60,
            reset: false,
        };

        uc.execute(&PathBuf::from("fiqh.pdf"), &options).await.unwrap();
        let report = uc.execute(&PathBuf::from("fiqh.pdf"), &options).await.unwrap();

        assert_eq!(report.collection_size, 4);
    }

    #[tokio::test]
    async fn shorter_rebuild_keeps_stale_tail_unless_reset() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let long = BuildOptions {
            max_length: 60,
            reset: false,
        };
        use_case(Some(TEXT), repo.clone())
            .execute(&PathBuf::from("fiqh.pdf"), &long)
            .await
            .unwrap();

        let short = use_case(Some("One short ruling."), repo.clone());
        let report = short
            .execute(&PathBuf::from("short.pdf"), &long)
            .await
            .unwrap();
        assert_eq!(report.chunk_count, 1);
        assert_eq!(report.collection_size, 4);

        let reset = BuildOptions {
            max_length: 60,
            reset: true,
        };
        let report = short.execute(&PathBuf::from("short.pdf"), &reset).await.unwrap();
        assert_eq!(report.collection_size, 1);
    }

    #[tokio::test]
    async fn extending_with_another_model_requires_reset() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let chunk = Chunk::new(0, "Built by another model.", "old.pdf");
        let embedding = Embedding::new(chunk.id().to_string(), vec![0.1; 384], "minilm".into());
        repo.save_batch(&[chunk], &[embedding]).await.unwrap();

        let uc = use_case(Some(TEXT), repo.clone());
        let err = uc
            .execute(&PathBuf::from("fiqh.pdf"), &BuildOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmbeddingError(_)));
        assert_eq!(repo.count().await.unwrap(), 1);

        let reset = BuildOptions {
            max_length: 60,
            reset: true,
        };
        uc.execute(&PathBuf::from("fiqh.pdf"), &reset).await.unwrap();
        assert_eq!(repo.models().await.unwrap(), vec!["mock-embedding"]);
    }

    #[tokio::test]
    async fn extraction_failure_aborts_without_writing() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let err = use_case(None, repo.clone())
            .execute(&PathBuf::from("missing.pdf"), &BuildOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_build_error());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn zero_max_length_is_rejected() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let options = BuildOptions {
            max_length: 0,
            reset: false,
        };
        let err = use_case(Some(TEXT), repo)
            .execute(&PathBuf::from("fiqh.pdf"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
