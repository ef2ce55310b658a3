use anyhow::Result;

use crate::domain::RetrievalResult;

use super::super::Container;

pub struct SearchController<'a> {
    container: &'a Container,
}

impl<'a> SearchController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn search(&self, query: String, k: usize) -> Result<String> {
        let use_case = self.container.retrieve_use_case();
        let result = use_case.execute(&query, k).await?;

        Ok(self.format_search_results(&result))
    }

    fn format_search_results(&self, result: &RetrievalResult) -> String {
        if result.is_empty() {
            return "No passages found.".to_string();
        }

        let mut output = format!("Found {} passages:\n\n", result.len());

        for (i, passage) in result.passages().iter().enumerate() {
            output.push_str(&format!(
                "{}. {} (score: {:.3})\n",
                i + 1,
                passage.chunk().id(),
                passage.score()
            ));

            let preview: String = passage
                .text()
                .lines()
                .map(|l| format!("   | {}", l))
                .collect::<Vec<_>>()
                .join("\n");
            output.push_str(&preview);
            output.push_str("\n\n");
        }

        output
    }
}
