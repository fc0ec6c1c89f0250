use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::error::DisambiguationError;
use super::llm::{DisambiguationChoice, Disambiguator};
use crate::vectordb::Neighbor;

#[derive(Debug, Clone)]
enum Script {
    Choose { code: String, confidence: f32 },
    /// Picks the lowest-ranked candidate offered.
    ChooseLast { confidence: f32 },
    Fail,
}

/// Scripted disambiguator for tests.
#[derive(Debug)]
pub struct MockDisambiguator {
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockDisambiguator {
    pub fn choosing(code: &str, confidence: f32) -> Self {
        Self::with_script(Script::Choose {
            code: code.to_string(),
            confidence,
        })
    }

    pub fn choosing_last(confidence: f32) -> Self {
        Self::with_script(Script::ChooseLast { confidence })
    }

    pub fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Disambiguator for MockDisambiguator {
    async fn disambiguate(
        &self,
        _title: &str,
        _description: &str,
        candidates: &[Neighbor],
    ) -> Result<DisambiguationChoice, DisambiguationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Choose { code, confidence } => Ok(DisambiguationChoice {
                code: code.clone(),
                confidence: *confidence,
                reasoning: format!("mock picked {}", code),
            }),
            Script::ChooseLast { confidence } => {
                let last = candidates
                    .last()
                    .ok_or_else(|| DisambiguationError::InvalidResponse {
                        reason: "no candidates offered".to_string(),
                    })?;
                Ok(DisambiguationChoice {
                    code: last.job.code.clone(),
                    confidence: *confidence,
                    reasoning: format!("mock picked {}", last.job.code),
                })
            }
            Script::Fail => Err(DisambiguationError::Unavailable {
                reason: "mock disambiguator offline".to_string(),
            }),
        }
    }
}
