//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `PAYGRADE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::aggregation::{AggregationConfig, PayPeriod};
use crate::cache::CacheConfig;
use crate::constants::{DEFAULT_CURRENCY, DEFAULT_EMBEDDING_DIM};
use crate::embedding::RemoteEmbedderConfig;
use crate::matching::{ChatDisambiguatorConfig, MatcherConfig};
use crate::vectordb::DEFAULT_COLLECTION_NAME;

/// Default embedding model requested from a remote provider.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default chat model used for disambiguation.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PAYGRADE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON seed catalog (reference jobs, sources, locations).
    pub catalog_path: Option<PathBuf>,

    /// Directory for the persisted version history. `None` keeps history in memory.
    pub storage_path: Option<PathBuf>,

    /// Qdrant endpoint. `None` searches an in-memory index built from the catalog.
    pub qdrant_url: Option<String>,

    pub qdrant_collection: String,

    /// OpenAI-compatible embeddings endpoint. `None` uses the offline hashing embedder.
    pub embedding_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    /// Default: `256`.
    pub embedding_dim: usize,

    /// OpenAI-compatible chat endpoint. `None` disables disambiguation.
    pub llm_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: String,

    pub matcher: MatcherConfig,
    pub aggregation: AggregationConfig,
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            storage_path: None,
            qdrant_url: None,
            qdrant_collection: DEFAULT_COLLECTION_NAME.to_string(),
            embedding_url: None,
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            llm_url: None,
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            matcher: MatcherConfig::default(),
            aggregation: AggregationConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    const ENV_CATALOG_PATH: &'static str = "PAYGRADE_CATALOG_PATH";
    const ENV_STORAGE_PATH: &'static str = "PAYGRADE_STORAGE_PATH";
    const ENV_QDRANT_URL: &'static str = "PAYGRADE_QDRANT_URL";
    const ENV_QDRANT_COLLECTION: &'static str = "PAYGRADE_QDRANT_COLLECTION";
    const ENV_EMBEDDING_URL: &'static str = "PAYGRADE_EMBEDDING_URL";
    const ENV_EMBEDDING_API_KEY: &'static str = "PAYGRADE_EMBEDDING_API_KEY";
    const ENV_EMBEDDING_MODEL: &'static str = "PAYGRADE_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIM: &'static str = "PAYGRADE_EMBEDDING_DIM";
    const ENV_LLM_URL: &'static str = "PAYGRADE_LLM_URL";
    const ENV_LLM_API_KEY: &'static str = "PAYGRADE_LLM_API_KEY";
    const ENV_LLM_MODEL: &'static str = "PAYGRADE_LLM_MODEL";
    const ENV_ACCEPT_THRESHOLD: &'static str = "PAYGRADE_ACCEPT_THRESHOLD";
    const ENV_MATCH_FLOOR: &'static str = "PAYGRADE_MATCH_FLOOR";
    const ENV_TOP_K: &'static str = "PAYGRADE_TOP_K";
    const ENV_VERSION_RETENTION: &'static str = "PAYGRADE_VERSION_RETENTION";
    const ENV_CURRENCY: &'static str = "PAYGRADE_CURRENCY";
    const ENV_PERIOD: &'static str = "PAYGRADE_PERIOD";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let accept_threshold =
            Self::parse_from_env(Self::ENV_ACCEPT_THRESHOLD, defaults.matcher.accept_threshold)?;
        let match_floor = Self::parse_from_env(Self::ENV_MATCH_FLOOR, defaults.matcher.match_floor)?;
        let top_k = Self::parse_from_env(Self::ENV_TOP_K, defaults.matcher.top_k)?;
        let matcher = defaults
            .matcher
            .with_thresholds(match_floor, accept_threshold)
            .with_top_k(top_k);

        let currency = Self::parse_string_from_env(Self::ENV_CURRENCY, DEFAULT_CURRENCY.to_string());
        let period = Self::parse_from_env(Self::ENV_PERIOD, defaults.aggregation.period)?;
        let aggregation = defaults
            .aggregation
            .with_currency(currency.to_uppercase())
            .with_period(period);

        let retention = Self::parse_from_env(Self::ENV_VERSION_RETENTION, defaults.cache.retention)?;

        Ok(Self {
            catalog_path: Self::parse_optional_from_env(Self::ENV_CATALOG_PATH).map(PathBuf::from),
            storage_path: Self::parse_optional_from_env(Self::ENV_STORAGE_PATH).map(PathBuf::from),
            qdrant_url: Self::parse_optional_from_env(Self::ENV_QDRANT_URL),
            qdrant_collection: Self::parse_string_from_env(
                Self::ENV_QDRANT_COLLECTION,
                defaults.qdrant_collection,
            ),
            embedding_url: Self::parse_optional_from_env(Self::ENV_EMBEDDING_URL),
            embedding_api_key: Self::parse_optional_from_env(Self::ENV_EMBEDDING_API_KEY),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_dim: Self::parse_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?,
            llm_url: Self::parse_optional_from_env(Self::ENV_LLM_URL),
            llm_api_key: Self::parse_optional_from_env(Self::ENV_LLM_API_KEY),
            llm_model: Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model),
            matcher,
            aggregation,
            cache: CacheConfig::default().with_retention(retention),
        })
    }

    /// Validates paths and component invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.catalog_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if let Some(ref path) = self.storage_path
            && path.exists()
            && !path.is_dir()
        {
            return Err(ConfigError::NotADirectory { path: path.clone() });
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::Invalid {
                reason: "embedding dimension cannot be zero".to_string(),
            });
        }

        self.matcher.validate().map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;
        self.aggregation.validate().map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Remote embedder settings, when an endpoint is configured.
    pub fn remote_embedder(&self) -> Option<RemoteEmbedderConfig> {
        let url = self.embedding_url.as_ref()?;
        let mut config = RemoteEmbedderConfig::new(url, &self.embedding_model, self.embedding_dim)
            .with_timeout(self.matcher.embed_timeout);
        if let Some(key) = &self.embedding_api_key {
            config = config.with_api_key(key);
        }
        Some(config)
    }

    /// Disambiguator settings, when a chat endpoint is configured.
    pub fn disambiguator(&self) -> Option<ChatDisambiguatorConfig> {
        let url = self.llm_url.as_ref()?;
        let mut config =
            ChatDisambiguatorConfig::new(url, &self.llm_model).with_timeout(self.matcher.llm_timeout);
        if let Some(key) = &self.llm_api_key {
            config = config.with_api_key(key);
        }
        Some(config)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => {
                value
                    .trim()
                    .parse()
                    .map_err(|e: T::Err| ConfigError::ParseError {
                        name: var_name,
                        value: value.clone(),
                        reason: e.to_string(),
                    })
            }
            _ => Ok(default),
        }
    }

    fn parse_optional_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_from_env(var_name).unwrap_or(default)
    }
}
