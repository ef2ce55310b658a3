use std::path::PathBuf;

use anyhow::Result;

use crate::application::{BuildOptions, IndexReport};

use super::super::Container;

pub struct IndexController<'a> {
    container: &'a Container,
}

impl<'a> IndexController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn index(&self, path: String, max_length: usize, reset: bool) -> Result<String> {
        let options = BuildOptions { max_length, reset };
        let use_case = self.container.build_index_use_case();
        let report = use_case.execute(&PathBuf::from(path), &options).await?;

        Ok(self.format_index_success(&report))
    }

    fn format_index_success(&self, report: &IndexReport) -> String {
        format!(
            "Indexed {} into collection '{}': {} chunks written, {} in collection ({:.1}s)",
            report.source,
            report.collection,
            report.chunk_count,
            report.collection_size,
            report.elapsed.as_secs_f64()
        )
    }
}
