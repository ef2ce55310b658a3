//! # Connector Layer
//!
//! External integrations implementing the application interfaces:
//! - Embedding generation (ONNX sentence transformer, or hash-based mock)
//! - Storage (DuckDB collection, in-memory for tests)
//! - PDF text extraction
//! - HTTP clients for the metric provider and the local chat model
//!
//! The `api` module wires them into use cases for the CLI.

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::{Container, ContainerConfig, Router};
