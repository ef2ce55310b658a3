use std::path::Path;

use async_trait::async_trait;

use crate::domain::{Document, DomainError};

/// Extracts normalized text from a page-oriented source file.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Concatenates the text of every page, collapses whitespace runs and
    /// trims the result. Fails when the file is missing or unparseable.
    async fn extract(&self, path: &Path) -> Result<Document, DomainError>;
}
