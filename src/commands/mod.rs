//! CLI commands implementation

pub mod models;
pub mod rerank;

pub use models::*;
pub use rerank::*;
