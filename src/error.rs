//! Custom error types for pinecone-rerank

use thiserror::Error;

/// Main error type for rerank operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Did not find `model`! Please pass `model` as a named parameter. \
         Please check the list of supported models: https://docs.pinecone.io/models/overview"
    )]
    MissingModel,

    #[error(
        "The 'client' parameter must be an instance of a Pinecone inference client \
         (supported kinds: pinecone, http); got '{0}'"
    )]
    InvalidClient(String),

    #[error("Pinecone API key not found: set {0} or pass an API key explicitly")]
    MissingApiKey(String),

    #[error("Rerank API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Result type alias for pinecone-rerank
pub type Result<T> = std::result::Result<T, Error>;
