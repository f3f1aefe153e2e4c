//! Document types shared with the retrieval framework
//!
//! Candidates may arrive as plain text, framework documents, or records the
//! caller already shaped for the rerank API. All of them are normalized into
//! a JSON record with an `id` before being sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key written by the compressor with the rerank score
pub const RELEVANCE_SCORE_KEY: &str = "relevance_score";

/// A retrieved document: text content plus free-form metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    /// Builder-style metadata insert
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Relevance score injected by a compressor, if any
    pub fn relevance_score(&self) -> Option<f64> {
        self.metadata.get(RELEVANCE_SCORE_KEY).and_then(Value::as_f64)
    }
}

/// One rerank candidate in any of the accepted shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RerankInput {
    Text(String),
    Document(Document),
    Record(Map<String, Value>),
}

impl RerankInput {
    /// Normalize into the record sent to the rerank API.
    ///
    /// Text and documents get `doc_{index}` as their id and their content
    /// under `text`; document metadata is merged on top. Records keep their
    /// own `id` and only get one assigned when it is missing.
    pub fn to_record(&self, index: usize) -> Map<String, Value> {
        match self {
            RerankInput::Text(text) => {
                let mut record = Map::new();
                record.insert("id".to_string(), Value::String(default_id(index)));
                record.insert("text".to_string(), Value::String(text.clone()));
                record
            }
            RerankInput::Document(doc) => {
                let mut record = Map::new();
                record.insert("id".to_string(), Value::String(default_id(index)));
                record.insert("text".to_string(), Value::String(doc.page_content.clone()));
                for (key, value) in &doc.metadata {
                    record.insert(key.clone(), value.clone());
                }
                record
            }
            RerankInput::Record(fields) => {
                let mut record = fields.clone();
                if !record.contains_key("id") {
                    record.insert("id".to_string(), Value::String(default_id(index)));
                }
                record
            }
        }
    }
}

/// Id assigned to candidates that do not carry one
pub fn default_id(index: usize) -> String {
    format!("doc_{}", index)
}

impl From<&str> for RerankInput {
    fn from(text: &str) -> Self {
        RerankInput::Text(text.to_string())
    }
}

impl From<String> for RerankInput {
    fn from(text: String) -> Self {
        RerankInput::Text(text)
    }
}

impl From<Document> for RerankInput {
    fn from(doc: Document) -> Self {
        RerankInput::Document(doc)
    }
}

impl From<&Document> for RerankInput {
    fn from(doc: &Document) -> Self {
        RerankInput::Document(doc.clone())
    }
}

impl From<Map<String, Value>> for RerankInput {
    fn from(record: Map<String, Value>) -> Self {
        RerankInput::Record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_text_to_record() {
        let record = RerankInput::from("just a string").to_record(0);
        assert_eq!(
            Value::Object(record),
            json!({"id": "doc_0", "text": "just a string"})
        );
    }

    #[test]
    fn test_document_to_record_merges_metadata() {
        let doc = Document::new("doc content").with_metadata("source", "test");
        let record = RerankInput::from(doc).to_record(0);
        assert_eq!(
            Value::Object(record),
            json!({"id": "doc_0", "text": "doc content", "source": "test"})
        );
    }

    #[test]
    fn test_record_with_id_is_unchanged() {
        let input = RerankInput::from(as_map(json!({"id": "custom-id", "content": "dict content"})));
        assert_eq!(
            Value::Object(input.to_record(0)),
            json!({"id": "custom-id", "content": "dict content"})
        );
    }

    #[test]
    fn test_record_without_id_gets_default() {
        let input = RerankInput::from(as_map(json!({"content": "dict content without id"})));
        assert_eq!(
            Value::Object(input.to_record(0)),
            json!({"id": "doc_0", "content": "dict content without id"})
        );
    }

    #[test]
    fn test_index_drives_default_id() {
        let record = RerankInput::from("third").to_record(2);
        assert_eq!(record["id"], json!("doc_2"));
    }

    #[test]
    fn test_untagged_deserialize() {
        let inputs: Vec<RerankInput> = serde_json::from_value(json!([
            "plain",
            {"page_content": "body", "metadata": {"source": "a"}},
            {"page_content": "body only"},
            {"id": "x", "text": "record"}
        ]))
        .unwrap();

        assert_eq!(inputs[0], RerankInput::Text("plain".to_string()));
        assert_eq!(
            inputs[1],
            RerankInput::Document(Document::new("body").with_metadata("source", "a"))
        );
        assert_eq!(inputs[2], RerankInput::Document(Document::new("body only")));
        assert!(matches!(inputs[3], RerankInput::Record(_)));
    }

    #[test]
    fn test_relevance_score_accessor() {
        let doc = Document::new("x").with_metadata(RELEVANCE_SCORE_KEY, 0.25);
        assert_eq!(doc.relevance_score(), Some(0.25));
        assert_eq!(Document::new("y").relevance_score(), None);
    }
}
