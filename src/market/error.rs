use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market source '{source_name}' unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("market source '{source_name}' returned invalid data: {reason}")]
    InvalidData { source_name: String, reason: String },
}
