use thiserror::Error;

/// Reference index failures.
#[derive(Debug, Error)]
pub enum VectorDbError {
    #[error("cannot reach Qdrant at '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("cannot create reference collection '{collection}': {message}")]
    CreateCollectionFailed { collection: String, message: String },

    #[error("cannot upsert reference jobs into '{collection}': {message}")]
    UpsertFailed { collection: String, message: String },

    #[error("reference search in '{collection}' failed: {message}")]
    SearchFailed { collection: String, message: String },

    #[error("vector has {actual} dimensions, index expects {expected}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("duplicate reference code: {code}")]
    DuplicateCode { code: String },
}
