//! pinecone-rerank: Pinecone hosted reranking behind document-retrieval interfaces
//!
//! The adapter normalizes candidate documents into rerank records, makes one
//! call to the Pinecone inference API and maps the ranked items back into
//! result records or score-annotated documents.

pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod inference;
pub mod models;
pub mod rerank;

pub use document::{Document, RerankInput};
pub use error::{Error, Result};
pub use rerank::{DocumentCompressor, PineconeRerank, RerankOptions, RerankResult, Reranker};
