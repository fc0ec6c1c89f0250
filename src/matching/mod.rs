//! Job matching: embedding, nearest-neighbour search and optional LLM disambiguation.
//!
//! Decision bands on the top cosine similarity:
//! - `>= accept_threshold`: accepted as `vector_only`.
//! - `[match_floor, accept_threshold)`: accepted unless cross-domain; several candidates
//!   within `ambiguity_margin` of the top are re-ranked by the [`Disambiguator`].
//! - `< match_floor`: not found.

pub mod config;
pub mod error;
pub mod llm;
pub mod matcher;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod types;


pub use config::{DEFAULT_EMBED_RETRIES, DEFAULT_RETRY_BACKOFF, MatcherConfig};
pub use error::{DisambiguationError, MatchError};
pub use llm::{
    ChatDisambiguator, ChatDisambiguatorConfig, DisambiguationChoice, Disambiguator,
    build_prompt, parse_choice,
};
pub use matcher::{JobMatcher, query_text};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockDisambiguator;
pub use types::{MatchMethod, MatchOutcome, MatchResult, NotFoundReason};
