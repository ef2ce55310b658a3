mod analysis;
mod chunk;
mod document;
mod embedding;
mod financial_snapshot;
mod retrieval;

pub use analysis::*;
pub use chunk::*;
pub use document::*;
pub use embedding::*;
pub use financial_snapshot::*;
pub use retrieval::*;
