//! Configuration management for pinecone-rerank
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::inference::{InferenceBackendKind, Truncate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reranker configuration
    #[serde(default)]
    pub reranker: RerankerConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Reranker configuration (Pinecone hosted inference)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Inference client kind
    #[serde(default = "default_reranker_client")]
    pub client: String,

    /// Pinecone API host
    #[serde(default = "default_reranker_host")]
    pub host: String,

    /// Pinecone API version header value
    #[serde(default = "default_reranker_api_version")]
    pub api_version: String,

    /// Environment variable name for the Pinecone API key
    #[serde(default = "default_reranker_api_key_env")]
    pub api_key_env: String,

    /// Rerank model name (required before a reranker can be built)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Number of results to return after reranking
    #[serde(default = "default_reranker_top_n")]
    pub top_n: usize,

    /// Record fields the model ranks on (service default is `text`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_fields: Option<Vec<String>>,

    /// Ask the service to echo documents back
    #[serde(default = "default_reranker_return_documents")]
    pub return_documents: bool,

    /// Truncation strategy for over-long inputs (END or NONE)
    #[serde(default = "default_reranker_truncate")]
    pub truncate: String,

    /// Request timeout in seconds
    #[serde(default = "default_reranker_timeout")]
    pub timeout_secs: u64,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for pinecone-rerank data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            client: default_reranker_client(),
            host: default_reranker_host(),
            api_version: default_reranker_api_version(),
            api_key_env: default_reranker_api_key_env(),
            model: None,
            top_n: default_reranker_top_n(),
            rank_fields: None,
            return_documents: default_reranker_return_documents(),
            truncate: default_reranker_truncate(),
            timeout_secs: default_reranker_timeout(),
        }
    }
}

impl RerankerConfig {
    /// Get the Pinecone API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn client_kind(&self) -> Result<InferenceBackendKind> {
        self.client.parse()
    }

    pub fn truncate(&self) -> Result<Truncate> {
        self.truncate.parse()
    }
}

impl Config {
    /// Get the default base directory (~/.pinecone-rerank)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pinecone-rerank")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration rooted at the given base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        let mut config = Config::default();
        config.init_paths(Some(base_dir));
        config
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Validate configuration
    ///
    /// A missing model is not an error here; it is reported when a reranker
    /// is built, so `init` can write a config the user fills in later.
    pub fn validate(&self) -> Result<()> {
        let reranker = &self.reranker;

        reranker.client_kind()?;
        reranker.truncate()?;

        if reranker.top_n == 0 {
            return Err(Error::Config("reranker.top_n must be at least 1".to_string()));
        }

        if reranker.timeout_secs == 0 {
            return Err(Error::Config(
                "reranker.timeout_secs must be positive".to_string(),
            ));
        }

        if reranker.api_key_env.trim().is_empty() {
            return Err(Error::Config(
                "reranker.api_key_env must name an environment variable".to_string(),
            ));
        }

        url::Url::parse(&reranker.host)
            .map_err(|e| Error::Config(format!("Invalid reranker host URL: {}", e)))?;

        Ok(())
    }
}
