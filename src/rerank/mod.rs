//! Reranking through the Pinecone inference API
//!
//! [`PineconeRerank`] implements both retrieval-framework seams: the
//! [`Reranker`] record interface and the [`DocumentCompressor`] interface
//! that reorders documents and tags them with a relevance score.

mod pinecone;

pub use pinecone::*;

use crate::config::RerankerConfig;
use crate::document::{Document, RerankInput};
use crate::error::Result;
use crate::inference::Truncate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One ranked candidate as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    pub id: Option<String>,
    /// Position of the candidate in the submitted list
    pub index: Option<usize>,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Map<String, Value>>,
}

/// Per-call overrides for a rerank request
#[derive(Debug, Clone, Default)]
pub struct RerankOptions {
    pub model: Option<String>,
    pub rank_fields: Option<Vec<String>>,
    pub top_n: Option<usize>,
    pub truncate: Option<Truncate>,
}

#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, documents: Vec<RerankInput>, query: &str) -> Result<Vec<RerankResult>>;
    fn model_name(&self) -> &str;
}

/// Post-retrieval step that filters and reorders documents for a query
#[async_trait]
pub trait DocumentCompressor: Send + Sync {
    async fn compress_documents(&self, documents: &[Document], query: &str)
        -> Result<Vec<Document>>;
}

pub fn create_reranker(config: &RerankerConfig) -> Result<Box<dyn Reranker>> {
    let reranker = PineconeRerank::from_config(config)?.build()?;
    Ok(Box::new(reranker))
}
