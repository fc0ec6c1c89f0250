use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("corrupt record at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
