use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AggregationError {
    #[error("no market source returned usable data ({} attempted)", sources_attempted.len())]
    InsufficientData { sources_attempted: Vec<String> },

    #[error("invalid aggregation configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type AggregationResult<T> = Result<T, AggregationError>;
