//! LLM re-ranking of ambiguous candidates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::DisambiguationError;
use crate::constants::DEFAULT_LLM_TIMEOUT;
use crate::vectordb::Neighbor;

/// The model's pick among the offered candidates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisambiguationChoice {
    pub code: String,
    /// Selection confidence in `[0, 1]`.
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

#[async_trait]
/// Picks the best reference job for a query among close candidates.
pub trait Disambiguator: Send + Sync {
    async fn disambiguate(
        &self,
        title: &str,
        description: &str,
        candidates: &[Neighbor],
    ) -> Result<DisambiguationChoice, DisambiguationError>;
}

#[derive(Debug, Clone)]
pub struct ChatDisambiguatorConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl ChatDisambiguatorConfig {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: None,
            model: model.into(),
            timeout: DEFAULT_LLM_TIMEOUT,
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
}

/// Disambiguator backed by an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatDisambiguator {
    client: Client,
    config: ChatDisambiguatorConfig,
}

impl ChatDisambiguator {
    pub fn new(config: ChatDisambiguatorConfig) -> Result<Self, DisambiguationError> {
        if config.api_base.trim().is_empty() || config.model.trim().is_empty() {
            return Err(DisambiguationError::InvalidConfig {
                reason: "api_base and model are required".to_string(),
            });
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DisambiguationError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Disambiguator for ChatDisambiguator {
    #[instrument(skip_all, fields(model = %self.config.model, candidates = candidates.len()))]
    async fn disambiguate(
        &self,
        title: &str,
        description: &str,
        candidates: &[Neighbor],
    ) -> Result<DisambiguationChoice, DisambiguationError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0.0,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(title, description, candidates) },
            ],
        });

        let mut request = self.client.post(url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let json: Value = request.send().await?.error_for_status()?.json().await?;
        let content = json
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| DisambiguationError::InvalidResponse {
                reason: "response is missing choices[0].message.content".to_string(),
            })?;

        let choice = parse_choice(content)?;
        debug!(code = %choice.code, confidence = choice.confidence, "LLM selection received");
        Ok(choice)
    }
}

const SYSTEM_PROMPT: &str = "You map job postings to a reference job taxonomy. \
Pick the single best candidate. Reply with JSON only: \
{\"code\": \"<candidate code>\", \"confidence\": <0..1>, \"reasoning\": \"<one sentence>\"}";

/// User message listing the query and every candidate with its metadata.
pub fn build_prompt(title: &str, description: &str, candidates: &[Neighbor]) -> String {
    let mut prompt = format!("Job title: {}\n", title.trim());
    if !description.trim().is_empty() {
        prompt.push_str(&format!("Description: {}\n", description.trim()));
    }
    prompt.push_str("\nCandidates:\n");
    for neighbor in candidates {
        let job = &neighbor.job;
        prompt.push_str(&format!(
            "- code={} title=\"{}\" family=\"{}\"",
            job.code, job.title, job.family
        ));
        if let Some(level) = &job.level {
            prompt.push_str(&format!(" level=\"{}\"", level));
        }
        prompt.push_str(&format!(" similarity={:.3}\n", neighbor.similarity));
    }
    prompt
}

/// Parses the JSON object in a model reply, tolerating surrounding prose or code fences.
pub fn parse_choice(content: &str) -> Result<DisambiguationChoice, DisambiguationError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => {
            return Err(DisambiguationError::InvalidResponse {
                reason: "reply contains no JSON object".to_string(),
            });
        }
    };

    let mut choice: DisambiguationChoice =
        serde_json::from_str(json).map_err(|e| DisambiguationError::InvalidResponse {
            reason: e.to_string(),
        })?;

    if !choice.confidence.is_finite() {
        return Err(DisambiguationError::InvalidResponse {
            reason: "confidence is not a number".to_string(),
        });
    }
    choice.confidence = choice.confidence.clamp(0.0, 1.0);
    choice.code = choice.code.trim().to_string();
    Ok(choice)
}
