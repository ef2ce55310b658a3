use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AnalyzeController, IndexController, SearchController, StatsController};

pub struct Router<'a> {
    index_controller: IndexController<'a>,
    analyze_controller: AnalyzeController<'a>,
    search_controller: SearchController<'a>,
    stats_controller: StatsController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            index_controller: IndexController::new(container),
            analyze_controller: AnalyzeController::new(container),
            search_controller: SearchController::new(container),
            stats_controller: StatsController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Index {
                path,
                max_length,
                reset,
            } => self.index_controller.index(path, max_length, reset).await,
            Commands::Analyze { ticker, api_key, k } => {
                self.analyze_controller.analyze(ticker, api_key, k).await
            }
            Commands::Search { query, k } => self.search_controller.search(query, k).await,
            Commands::Stats => self.stats_controller.stats().await,
        }
    }
}
