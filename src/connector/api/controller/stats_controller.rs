use anyhow::Result;

use crate::application::CollectionStats;

use super::super::Container;

pub struct StatsController<'a> {
    container: &'a Container,
}

impl<'a> StatsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn stats(&self) -> Result<String> {
        let use_case = self.container.stats_use_case();
        let stats = use_case.execute().await?;
        Ok(self.format_stats(&stats))
    }

    fn format_stats(&self, stats: &CollectionStats) -> String {
        format!(
            "Shariah Screener Statistics\n===========================\nCollection:   {}\nTotal Chunks: {}\nData Dir:     {}",
            stats.collection,
            stats.chunk_count,
            self.container.data_dir()
        )
    }
}
