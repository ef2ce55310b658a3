//! Pure text and formatting services used by both pipelines.

mod chunker;
mod summary;
mod text;

pub use chunker::*;
pub use summary::*;
pub use text::*;
