mod analyze_compliance;
mod build_index;
mod collection_stats;
mod retrieve_passages;
mod screen_stock;

pub use analyze_compliance::*;
pub use build_index::*;
pub use collection_stats::*;
pub use retrieve_passages::*;
pub use screen_stock::*;
