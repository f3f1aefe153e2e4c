use super::{DocumentCompressor, RerankOptions, RerankResult, Reranker};
use crate::config::RerankerConfig;
use crate::document::{default_id, Document, RerankInput, RELEVANCE_SCORE_KEY};
use crate::error::{Error, Result};
use crate::inference::{
    InferenceBackendKind, InferenceClient, PineconeInferenceClient, RankedItem, RerankParameters,
    RerankRequest, Truncate,
};
use crate::models::rerank_model_spec;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reranker backed by Pinecone hosted inference
pub struct PineconeRerank {
    client: Arc<dyn InferenceClient>,
    model: String,
    top_n: usize,
    rank_fields: Option<Vec<String>>,
    return_documents: bool,
    truncate: Truncate,
}

impl fmt::Debug for PineconeRerank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeRerank")
            .field("model", &self.model)
            .field("top_n", &self.top_n)
            .field("rank_fields", &self.rank_fields)
            .field("return_documents", &self.return_documents)
            .field("truncate", &self.truncate)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PineconeRerank`]; all validation happens in [`build`](Self::build)
pub struct PineconeRerankBuilder {
    config: Option<RerankerConfig>,
    client: Option<Arc<dyn InferenceClient>>,
    client_kind: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    top_n: usize,
    rank_fields: Option<Vec<String>>,
    return_documents: bool,
    truncate: Truncate,
}

impl PineconeRerank {
    pub fn builder() -> PineconeRerankBuilder {
        PineconeRerankBuilder {
            config: None,
            client: None,
            client_kind: None,
            api_key: None,
            model: None,
            top_n: crate::config::default_reranker_top_n(),
            rank_fields: None,
            return_documents: crate::config::default_reranker_return_documents(),
            truncate: Truncate::default(),
        }
    }

    /// Builder seeded from configuration; explicit builder calls override it
    pub fn from_config(config: &RerankerConfig) -> Result<PineconeRerankBuilder> {
        Ok(PineconeRerankBuilder {
            config: Some(config.clone()),
            client: None,
            client_kind: Some(config.client.clone()),
            api_key: None,
            model: config.model.clone(),
            top_n: config.top_n,
            rank_fields: config.rank_fields.clone(),
            return_documents: config.return_documents,
            truncate: config.truncate()?,
        })
    }

    pub fn client(&self) -> &Arc<dyn InferenceClient> {
        &self.client
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn rank_fields(&self) -> Option<&[String]> {
        self.rank_fields.as_deref()
    }

    pub fn return_documents(&self) -> bool {
        self.return_documents
    }

    /// Record sent to the API for the candidate at `index`
    pub fn document_to_record(&self, document: &RerankInput, index: usize) -> Map<String, Value> {
        document.to_record(index)
    }

    /// Rerank candidates with the configured model, rank fields and top-n.
    ///
    /// An empty candidate list returns an empty result without calling the
    /// service.
    pub async fn rerank<I>(&self, documents: Vec<I>, query: &str) -> Result<Vec<RerankResult>>
    where
        I: Into<RerankInput>,
    {
        self.rerank_with(documents, query, RerankOptions::default())
            .await
    }

    /// Rerank with per-call overrides
    pub async fn rerank_with<I>(
        &self,
        documents: Vec<I>,
        query: &str,
        options: RerankOptions,
    ) -> Result<Vec<RerankResult>>
    where
        I: Into<RerankInput>,
    {
        let model = options.model.unwrap_or_else(|| self.model.clone());
        let top_n = options.top_n.unwrap_or(self.top_n);
        let rank_fields = options.rank_fields.or_else(|| self.rank_fields.clone());
        check_request_shape(&model, top_n, rank_fields.as_deref())?;

        if documents.is_empty() {
            debug!("No documents to rerank");
            return Ok(Vec::new());
        }

        let records: Vec<Map<String, Value>> = documents
            .into_iter()
            .enumerate()
            .map(|(index, doc)| {
                let input: RerankInput = doc.into();
                input.to_record(index)
            })
            .collect();

        if let Some(spec) = rerank_model_spec(&model) {
            if records.len() > spec.max_documents {
                warn!(
                    "Model '{}' accepts at most {} documents per request; sending {}",
                    model,
                    spec.max_documents,
                    records.len()
                );
            }
        }

        let request = RerankRequest {
            model,
            query: query.to_string(),
            documents: records,
            rank_fields,
            top_n: Some(top_n),
            return_documents: self.return_documents,
            parameters: RerankParameters {
                truncate: options.truncate.unwrap_or(self.truncate),
            },
        };

        info!(
            "Reranking {} documents with model '{}'",
            request.documents.len(),
            request.model
        );

        let submitted_ids: Vec<Option<String>> = request
            .documents
            .iter()
            .map(|record| record.get("id").map(id_string))
            .collect();

        let response = self.client.rerank(request).await?;
        debug!("Rerank returned {} results", response.data.len());

        Ok(response
            .data
            .into_iter()
            .map(|item| self.to_result(item, &submitted_ids))
            .collect())
    }

    fn to_result(&self, item: RankedItem, submitted_ids: &[Option<String>]) -> RerankResult {
        let id = item
            .id
            .as_ref()
            .map(id_string)
            .or_else(|| {
                item.document
                    .as_ref()
                    .and_then(|doc| doc.get("id"))
                    .map(id_string)
            })
            .or_else(|| {
                item.index.map(|index| {
                    submitted_ids
                        .get(index)
                        .cloned()
                        .flatten()
                        .unwrap_or_else(|| default_id(index))
                })
            });

        RerankResult {
            id,
            index: item.index,
            score: item.score,
            document: if self.return_documents {
                item.document
            } else {
                None
            },
        }
    }

    /// Map ranked results back onto the original documents.
    ///
    /// Each kept document is a copy of the original with `relevance_score`
    /// set in its metadata. Results without a usable index are dropped.
    pub fn apply_results(documents: &[Document], results: &[RerankResult]) -> Vec<Document> {
        let mut compressed = Vec::with_capacity(results.len());

        for result in results {
            let Some(index) = result.index else {
                debug!("Skipping rerank result {:?} without index", result.id);
                continue;
            };
            let Some(original) = documents.get(index) else {
                warn!(
                    "Rerank result index {} out of range for {} documents",
                    index,
                    documents.len()
                );
                continue;
            };

            let mut doc = original.clone();
            doc.metadata
                .insert(RELEVANCE_SCORE_KEY.to_string(), Value::from(result.score));
            compressed.push(doc);
        }

        compressed
    }
}

/// Limits shared by construction and per-call overrides
fn check_request_shape(model: &str, top_n: usize, rank_fields: Option<&[String]>) -> Result<()> {
    if top_n == 0 {
        return Err(Error::Config("top_n must be at least 1".to_string()));
    }

    if let Some(spec) = rerank_model_spec(model) {
        let field_count = rank_fields.map_or(0, <[String]>::len);
        if field_count > 1 && !spec.multiple_rank_fields {
            return Err(Error::Config(format!(
                "Model '{}' supports a single rank field, got {}",
                model, field_count
            )));
        }
    }

    Ok(())
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl PineconeRerankBuilder {
    /// Use an existing inference client instead of creating one
    pub fn client(mut self, client: Arc<dyn InferenceClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Client kind by name, as it appears in configuration
    pub fn client_kind(mut self, kind: impl Into<String>) -> Self {
        self.client_kind = Some(kind.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn rank_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.rank_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn return_documents(mut self, return_documents: bool) -> Self {
        self.return_documents = return_documents;
        self
    }

    pub fn truncate(mut self, truncate: Truncate) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn build(self) -> Result<PineconeRerank> {
        if let Some(kind) = &self.client_kind {
            match kind.parse::<InferenceBackendKind>()? {
                InferenceBackendKind::Pinecone => {}
            }
        }

        let model = self
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or(Error::MissingModel)?;

        check_request_shape(&model, self.top_n, self.rank_fields.as_deref())?;
        if rerank_model_spec(&model).is_none() {
            warn!(
                "Rerank model '{}' is not in the known model list; the service may reject it",
                model
            );
        }

        let client: Arc<dyn InferenceClient> = match self.client {
            Some(client) => client,
            None => match (self.api_key, &self.config) {
                (Some(key), Some(config)) => Arc::new(PineconeInferenceClient::new(config, &key)?),
                (Some(key), None) => {
                    Arc::new(PineconeInferenceClient::new(&RerankerConfig::default(), &key)?)
                }
                (None, Some(config)) => Arc::new(PineconeInferenceClient::from_config(config)?),
                (None, None) => Arc::new(PineconeInferenceClient::from_env()?),
            },
        };

        Ok(PineconeRerank {
            client,
            model,
            top_n: self.top_n,
            rank_fields: self.rank_fields,
            return_documents: self.return_documents,
            truncate: self.truncate,
        })
    }
}

#[async_trait]
impl Reranker for PineconeRerank {
    async fn rerank(&self, documents: Vec<RerankInput>, query: &str) -> Result<Vec<RerankResult>> {
        PineconeRerank::rerank(self, documents, query).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl DocumentCompressor for PineconeRerank {
    async fn compress_documents(
        &self,
        documents: &[Document],
        query: &str,
    ) -> Result<Vec<Document>> {
        let results = PineconeRerank::rerank(self, documents.to_vec(), query).await?;
        Ok(Self::apply_results(documents, &results))
    }
}
