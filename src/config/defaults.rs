//! Default values for configuration

/// Default inference client kind
pub fn default_reranker_client() -> String {
    "pinecone".to_string()
}

/// Default Pinecone API host; `PINECONE_HOST` overrides it
pub fn default_reranker_host() -> String {
    std::env::var("PINECONE_HOST").unwrap_or_else(|_| "https://api.pinecone.io".to_string())
}

/// Default value for the `X-Pinecone-API-Version` header
pub fn default_reranker_api_version() -> String {
    "2025-01".to_string()
}

/// Default environment variable name for the Pinecone API key
pub fn default_reranker_api_key_env() -> String {
    "PINECONE_API_KEY".to_string()
}

/// Default number of results to keep
pub fn default_reranker_top_n() -> usize {
    3
}

/// Default: echo documents back in the response
pub fn default_reranker_return_documents() -> bool {
    true
}

/// Default truncation strategy
pub fn default_reranker_truncate() -> String {
    "END".to_string()
}

/// Default request timeout in seconds
pub fn default_reranker_timeout() -> u64 {
    30
}
