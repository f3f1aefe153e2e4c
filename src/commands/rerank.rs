//! Rerank and compress command implementations

use crate::config::{Config, RerankerConfig};
use crate::document::{Document, RerankInput};
use crate::error::{Error, Result};
use crate::inference::Truncate;
use crate::rerank::{
    create_reranker, DocumentCompressor, PineconeRerank, RerankOptions, RerankResult, Reranker,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Command-line overrides for a rerank call
#[derive(Debug, Clone, Default)]
pub struct RerankCommandOptions {
    pub model: Option<String>,
    pub top_n: Option<usize>,
    pub rank_fields: Option<Vec<String>>,
    pub truncate: Option<Truncate>,
    pub no_documents: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RerankOutput {
    pub query: String,
    pub model: String,
    pub results: Vec<RerankResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressOutput {
    pub query: String,
    pub documents: Vec<Document>,
}

/// Read a JSON array of candidates from a file, or stdin when no path is given
pub fn read_inputs(path: Option<&Path>) -> Result<Vec<RerankInput>> {
    let content = match path {
        Some(path) => {
            debug!("Reading candidates from {:?}", path);
            std::fs::read_to_string(path)?
        }
        None => {
            debug!("Reading candidates from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    parse_inputs(&content)
}

pub fn parse_inputs(content: &str) -> Result<Vec<RerankInput>> {
    let value: Value = serde_json::from_str(content)?;
    if !value.is_array() {
        return Err(Error::Other(
            "Expected a JSON array of strings, documents or records".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

/// Turn any candidate shape into a framework document.
///
/// Records use their `text` field as content and keep the other fields as
/// metadata.
pub fn input_to_document(input: RerankInput) -> Document {
    match input {
        RerankInput::Text(text) => Document::new(text),
        RerankInput::Document(doc) => doc,
        RerankInput::Record(mut record) => {
            let page_content = match record.remove("text") {
                Some(Value::String(text)) => text,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Document {
                page_content,
                metadata: record,
            }
        }
    }
}

fn effective_config(config: &Config, options: &RerankCommandOptions) -> RerankerConfig {
    let mut reranker = config.reranker.clone();
    if let Some(model) = &options.model {
        reranker.model = Some(model.clone());
    }
    if options.no_documents {
        reranker.return_documents = false;
    }
    reranker
}

/// Rerank candidates and return scored records
pub async fn cmd_rerank(
    config: &Config,
    query: &str,
    inputs: Vec<RerankInput>,
    options: RerankCommandOptions,
) -> Result<RerankOutput> {
    info!("Reranking {} candidates for: {}", inputs.len(), query);

    let reranker_config = effective_config(config, &options);
    let has_overrides =
        options.top_n.is_some() || options.rank_fields.is_some() || options.truncate.is_some();

    let (model, results) = if has_overrides {
        let reranker = PineconeRerank::from_config(&reranker_config)?.build()?;
        let overrides = RerankOptions {
            model: None,
            rank_fields: options.rank_fields,
            top_n: options.top_n,
            truncate: options.truncate,
        };
        let results = reranker.rerank_with(inputs, query, overrides).await?;
        (reranker.model().to_string(), results)
    } else {
        let reranker = create_reranker(&reranker_config)?;
        let results = reranker.rerank(inputs, query).await?;
        (reranker.model_name().to_string(), results)
    };

    Ok(RerankOutput {
        query: query.to_string(),
        model,
        results,
    })
}

/// Rerank documents and return them reordered with relevance scores
pub async fn cmd_compress(
    config: &Config,
    query: &str,
    inputs: Vec<RerankInput>,
    options: RerankCommandOptions,
) -> Result<CompressOutput> {
    let documents: Vec<Document> = inputs.into_iter().map(input_to_document).collect();
    info!("Compressing {} documents for: {}", documents.len(), query);

    let mut builder = PineconeRerank::from_config(&effective_config(config, &options))?;
    if let Some(top_n) = options.top_n {
        builder = builder.top_n(top_n);
    }
    if let Some(fields) = options.rank_fields {
        builder = builder.rank_fields(fields);
    }
    if let Some(truncate) = options.truncate {
        builder = builder.truncate(truncate);
    }
    let reranker = builder.build()?;

    let documents = reranker.compress_documents(&documents, query).await?;
    Ok(CompressOutput {
        query: query.to_string(),
        documents,
    })
}

/// Print rerank results to console
pub fn print_rerank_results(output: &RerankOutput) {
    println!("\nQuery: {} (model {})\n", output.query, output.model);
    println!("{} results:\n", output.results.len());

    for (rank, r) in output.results.iter().enumerate() {
        let id = r.id.as_deref().unwrap_or("-");
        let index = r
            .index
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}. [score: {:.4}] {} (index {})", rank + 1, r.score, id, index);

        if let Some(text) = r
            .document
            .as_ref()
            .and_then(|doc| doc.get("text"))
            .and_then(Value::as_str)
        {
            println!("   {}\n", preview(text));
        }
    }
}

/// Print compressed documents to console
pub fn print_compressed(output: &CompressOutput) {
    println!("\nQuery: {}\n", output.query);
    println!("{} documents:\n", output.documents.len());

    for (rank, doc) in output.documents.iter().enumerate() {
        let score = doc.relevance_score().unwrap_or_default();
        println!("{}. [score: {:.4}]", rank + 1, score);
        println!("   {}\n", preview(&doc.page_content));
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    let shown = match trimmed.char_indices().nth(200) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    };
    shown.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_inputs_mixed() {
        let inputs = parse_inputs(
            r#"["plain", {"page_content": "doc", "metadata": {"source": "a"}}, {"id": "r1", "text": "record"}]"#,
        )
        .unwrap();
        assert_eq!(inputs.len(), 3);
        assert!(matches!(inputs[0], RerankInput::Text(_)));
        assert!(matches!(inputs[1], RerankInput::Document(_)));
        assert!(matches!(inputs[2], RerankInput::Record(_)));
    }

    #[test]
    fn test_parse_inputs_rejects_non_array() {
        assert!(parse_inputs(r#"{"text": "x"}"#).is_err());
        assert!(parse_inputs("not json").is_err());
    }

    #[test]
    fn test_input_to_document() {
        let inputs = parse_inputs(r#"[{"id": "r1", "text": "record", "title": "T"}]"#).unwrap();
        let doc = input_to_document(inputs.into_iter().next().unwrap());
        assert_eq!(doc.page_content, "record");
        assert_eq!(doc.metadata["id"], json!("r1"));
        assert_eq!(doc.metadata["title"], json!("T"));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 203);
        assert_eq!(preview(" a\nb "), "a b");
    }

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.reranker.host = server.uri();
        config.reranker.model = Some("bge-reranker-v2-m3".to_string());
        config.reranker.api_key_env = "PINECONE_RERANK_CMD_TEST_KEY".to_string();
        config
    }

    async fn mount_rerank(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/rerank"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "bge-reranker-v2-m3",
                "data": [
                    {"index": 1, "score": 0.8, "document": {"id": "doc_1", "text": "second"}},
                    {"index": 0, "score": 0.1, "document": {"id": "doc_0", "text": "first"}}
                ]
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_cmd_rerank_and_compress() {
        std::env::set_var("PINECONE_RERANK_CMD_TEST_KEY", "fake-api-key");

        let server = MockServer::start().await;
        mount_rerank(&server).await;
        let config = config_for(&server);
        let inputs = parse_inputs(r#"["first", "second"]"#).unwrap();

        let output = cmd_rerank(&config, "q", inputs, RerankCommandOptions::default())
            .await
            .unwrap();
        assert_eq!(output.model, "bge-reranker-v2-m3");
        assert_eq!(output.results[0].id.as_deref(), Some("doc_1"));

        let server = MockServer::start().await;
        mount_rerank(&server).await;
        let config = config_for(&server);
        let inputs = parse_inputs(r#"["first", "second"]"#).unwrap();
        let options = RerankCommandOptions {
            top_n: Some(2),
            ..Default::default()
        };

        let output = cmd_compress(&config, "q", inputs, options).await.unwrap();
        assert_eq!(output.documents.len(), 2);
        assert_eq!(output.documents[0].page_content, "second");
        assert_eq!(output.documents[0].relevance_score(), Some(0.8));
    }
}
