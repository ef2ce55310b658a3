use serde::{Deserialize, Serialize};

use super::Chunk;

/// A chunk returned by similarity search together with its cosine score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    chunk: Chunk,
    score: f32,
}

impl RetrievedPassage {
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self { chunk, score }
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn text(&self) -> &str {
        self.chunk.content()
    }

    pub fn score(&self) -> f32 {
        self.score
    }
}

/// Top-k passages ordered by descending similarity. Ties keep whatever order
/// the store produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    query: String,
    passages: Vec<RetrievedPassage>,
}

impl RetrievalResult {
    pub fn new(query: impl Into<String>, passages: Vec<RetrievedPassage>) -> Self {
        Self {
            query: query.into(),
            passages,
        }
    }

    /// No context available. Not an error.
    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn passages(&self) -> &[RetrievedPassage] {
        &self.passages
    }

    pub fn texts(&self) -> Vec<&str> {
        self.passages.iter().map(|p| p.text()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Joins the passages into the single context string given to the
    /// assessment stage. Empty when nothing was retrieved.
    pub fn context(&self) -> String {
        self.texts().join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_joins_passages_in_order() {
        let result = RetrievalResult::new(
            "q",
            vec![
                RetrievedPassage::new(Chunk::new(0, "Riba is prohibited.", "a.pdf"), 0.9),
                RetrievedPassage::new(Chunk::new(1, "Debt should be limited.", "a.pdf"), 0.8),
            ],
        );
        assert_eq!(result.context(), "Riba is prohibited.\n\nDebt should be limited.");
    }

    #[test]
    fn empty_result_has_empty_context() {
        let result = RetrievalResult::empty("q");
        assert!(result.is_empty());
        assert_eq!(result.context(), "");
    }
}
