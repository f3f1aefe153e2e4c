use super::{InferenceClient, RerankRequest, RerankResponse};
use crate::config::{default_reranker_api_key_env, RerankerConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const API_KEY_HEADER: &str = "api-key";
const API_VERSION_HEADER: &str = "x-pinecone-api-version";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// HTTP client for the Pinecone inference API
pub struct PineconeInferenceClient {
    client: Client,
    base_url: Url,
}

impl PineconeInferenceClient {
    pub fn new(config: &RerankerConfig, api_key: &str) -> Result<Self> {
        let mut base_url = Url::parse(&config.host)
            .map_err(|e| Error::Config(format!("Invalid reranker host URL: {}", e)))?;
        // Relative joins only keep a path prefix that ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| Error::Config("Pinecone API key is not a valid header value".to_string()))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        headers.insert(
            API_VERSION_HEADER,
            HeaderValue::from_str(&config.api_version).map_err(|_| {
                Error::Config(format!("Invalid API version '{}'", config.api_version))
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Build a client from the key in the configured environment variable
    pub fn from_config(config: &RerankerConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| Error::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, &api_key)
    }

    /// Build a client with default settings and the key in `PINECONE_API_KEY`
    pub fn from_env() -> Result<Self> {
        let config = RerankerConfig {
            api_key_env: default_reranker_api_key_env(),
            ..RerankerConfig::default()
        };
        Self::from_config(&config)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid reranker host URL: {}", e)))
    }
}

#[async_trait]
impl InferenceClient for PineconeInferenceClient {
    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse> {
        let url = self.endpoint("rerank")?;
        debug!(
            "POST {} (model {}, {} documents)",
            url,
            request.model,
            request.documents.len()
        );

        let response = self.client.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let message = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => match parsed.error.code {
                    Some(code) => format!("{}: {}", code, parsed.error.message),
                    None => parsed.error.message,
                },
                Err(_) => body,
            };
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<RerankResponse>().await?)
    }
}
