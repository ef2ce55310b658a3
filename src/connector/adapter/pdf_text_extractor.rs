use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::application::TextExtractor;
use crate::domain::{normalize_text, Document, DomainError};

/// Extracts the text layer of a PDF. Scanned pages without a text layer yield
/// nothing; there is no OCR fallback.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<Document, DomainError> {
        if !path.is_file() {
            return Err(DomainError::extraction(format!(
                "File not found: {}",
                path.display()
            )));
        }

        info!("Extracting text from {}", path.display());
        let owned = path.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await
            .map_err(|e| DomainError::extraction(format!("Extraction task failed: {}", e)))?
            .map_err(|e| {
                DomainError::extraction(format!("Failed to read {}: {}", path.display(), e))
            })?;

        let text = normalize_text(&raw);
        debug!("Extracted {} characters from {}", text.chars().count(), path.display());
        Ok(Document::new(path.display().to_string(), text))
    }
}
