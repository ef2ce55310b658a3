pub mod analyze_controller;
pub mod index_controller;
pub mod search_controller;
pub mod stats_controller;

pub use analyze_controller::AnalyzeController;
pub use index_controller::IndexController;
pub use search_controller::SearchController;
pub use stats_controller::StatsController;
