//! OpenAI-compatible `/embeddings` client.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use super::EmbeddingProvider;
use super::error::EmbeddingError;
use crate::constants::DEFAULT_EMBED_TIMEOUT;

#[derive(Debug, Clone)]
pub struct RemoteEmbedderConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Declared output dimension; responses of any other length are rejected.
    pub dimension: usize,
    pub timeout: Duration,
}

impl RemoteEmbedderConfig {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: None,
            model: model.into(),
            dimension,
            timeout: DEFAULT_EMBED_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.api_base.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "api_base cannot be empty".to_string(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model cannot be empty".to_string(),
            });
        }
        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "dimension must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    client: Client,
    config: RemoteEmbedderConfig,
}

impl RemoteEmbedder {
    pub fn new(config: RemoteEmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteEmbedderConfig {
        &self.config
    }
}

impl EmbeddingProvider for RemoteEmbedder {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    #[instrument(skip(self, text), fields(model = %self.config.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let url = format!("{}/embeddings", self.config.api_base.trim_end_matches('/'));
        let body = serde_json::json!({ "model": self.config.model, "input": text });

        let mut request = self.client.post(url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EmbeddingError::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                }
            } else {
                EmbeddingError::from(e)
            }
        })?;

        let json: Value = response.error_for_status()?.json().await?;
        let vector = parse_embedding_response(&json)?;

        if vector.len() != self.config.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }

        debug!(dim = vector.len(), "Remote embedding received");
        Ok(vector)
    }
}

/// Extracts `data[0].embedding` from an OpenAI-style response.
pub fn parse_embedding_response(json: &Value) -> Result<Vec<f32>, EmbeddingError> {
    let values = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .and_then(|item| item.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| EmbeddingError::InvalidResponse {
            reason: "response is missing data[0].embedding".to_string(),
        })?;

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbeddingError::InvalidResponse {
                    reason: "embedding contains a non-numeric value".to_string(),
                })
        })
        .collect()
}
