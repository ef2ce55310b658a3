use serde::{Deserialize, Serialize};

const CHUNK_ID_PREFIX: &str = "doc_";

/// A retrievable span of document text.
///
/// Identifiers are positional (`doc_<i>`) and only unique within one build
/// run, so rebuilding into the same collection overwrites matching ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    id: String,
    content: String,
    source: String,
    position: u64,
}

impl Chunk {
    pub fn new(position: u64, content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Self::id_for(position),
            content: content.into(),
            source: source.into(),
            position,
        }
    }

    /// Rebuilds a chunk read back from storage.
    pub fn reconstitute(id: String, content: String, source: String, position: u64) -> Self {
        Self {
            id,
            content,
            source,
            position,
        }
    }

    pub fn id_for(position: u64) -> String {
        format!("{}{}", CHUNK_ID_PREFIX, position)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_positional() {
        let chunk = Chunk::new(7, "text", "book.pdf");
        assert_eq!(chunk.id(), "doc_7");
        assert_eq!(chunk.position(), 7);
        assert_eq!(Chunk::id_for(0), "doc_0");
    }
}
