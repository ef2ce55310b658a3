use serde::{Deserialize, Serialize};

/// Normalized text extracted from a source file. Only lives for the
/// duration of an index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    source: String,
    text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }
}
