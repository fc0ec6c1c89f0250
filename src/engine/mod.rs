//! Request orchestration.
//!
//! [`SalaryEngine::recommend`] validates the request, fingerprints it and hands the
//! versioned cache a computation that runs match -> aggregate -> score. "No match" and
//! "no market data" come back as [`RecommendOutcome::NoRecommendation`], not as errors.

pub mod error;
mod pipeline;
pub mod service;
pub mod types;


pub use error::EngineError;
pub use service::SalaryEngine;
pub use types::{
    JobQuery, MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, MAX_REQUESTER_LEN, MAX_TITLE_LEN,
    NoRecommendation, NoRecommendationReason, RecommendOutcome, RecommendRequest,
    RecommendationResult,
};
