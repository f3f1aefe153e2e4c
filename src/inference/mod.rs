//! Pinecone inference API: rerank request/response contract and clients

mod http_backend;

pub use http_backend::*;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of inference client named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceBackendKind {
    Pinecone,
}

impl FromStr for InferenceBackendKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "pinecone" | "http" | "https" => Ok(Self::Pinecone),
            _ => Err(Error::InvalidClient(value.to_string())),
        }
    }
}

/// How the service handles inputs longer than the model's context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Truncate {
    #[default]
    End,
    None,
}

impl FromStr for Truncate {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "END" => Ok(Self::End),
            "NONE" => Ok(Self::None),
            _ => Err(Error::Config(format!(
                "Unsupported truncate value '{}'; expected END or NONE",
                value
            ))),
        }
    }
}

impl fmt::Display for Truncate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Truncate::End => f.write_str("END"),
            Truncate::None => f.write_str("NONE"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankParameters {
    pub truncate: Truncate,
}

/// Body of `POST /rerank`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankRequest {
    pub model: String,
    pub query: String,
    pub documents: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    pub return_documents: bool,
    #[serde(default)]
    pub parameters: RerankParameters,
}

/// One scored entry in a rerank response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    /// Echoed id; services may send strings or numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub index: Option<usize>,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankUsage {
    #[serde(default)]
    pub rerank_units: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub data: Vec<RankedItem>,
    #[serde(default)]
    pub usage: Option<RerankUsage>,
}

/// Anything that can serve a rerank request
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(
            "pinecone".parse::<InferenceBackendKind>().unwrap(),
            InferenceBackendKind::Pinecone
        );
        assert_eq!(
            " HTTP ".parse::<InferenceBackendKind>().unwrap(),
            InferenceBackendKind::Pinecone
        );

        let err = "not a pinecone client"
            .parse::<InferenceBackendKind>()
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("The 'client' parameter must be an instance of"));
    }

    #[test]
    fn test_truncate_parse_and_display() {
        assert_eq!("end".parse::<Truncate>().unwrap(), Truncate::End);
        assert_eq!("NONE".parse::<Truncate>().unwrap(), Truncate::None);
        assert!("start".parse::<Truncate>().is_err());
        assert_eq!(Truncate::End.to_string(), "END");
    }

    #[test]
    fn test_request_serialization_omits_absent_options() {
        let request = RerankRequest {
            model: "test-model".to_string(),
            query: "q".to_string(),
            documents: vec![],
            rank_fields: None,
            top_n: None,
            return_documents: false,
            parameters: RerankParameters::default(),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "test-model",
                "query": "q",
                "documents": [],
                "return_documents": false,
                "parameters": {"truncate": "END"}
            })
        );
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: RerankResponse = serde_json::from_value(json!({
            "data": [
                {"index": 1, "score": 0.5},
                {"score": 0.1, "document": {"id": "x", "text": "y"}}
            ]
        }))
        .unwrap();

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].index, Some(1));
        assert!(response.data[0].document.is_none());
        assert_eq!(response.data[1].index, None);
        assert!(response.usage.is_none());
    }

    #[test]
    fn test_response_accepts_numeric_item_id() {
        let response: RerankResponse = serde_json::from_value(json!({
            "data": [
                {"id": 7, "index": 0, "score": 0.4},
                {"id": "doc_1", "index": 1, "score": 0.2},
                {"id": null, "index": 2, "score": 0.1}
            ]
        }))
        .unwrap();

        assert_eq!(response.data[0].id, Some(json!(7)));
        assert_eq!(response.data[1].id, Some(json!("doc_1")));
        assert_eq!(response.data[2].id, None);
    }
}
