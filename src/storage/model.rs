//! Persisted records.

use rkyv::{Archive, Deserialize, Serialize};

/// One immutable version of a recommendation.
///
/// `payload` is the JSON-encoded result; timestamps are Unix milliseconds.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct StoredVersion {
    pub fingerprint: [u8; 32],
    pub version: u64,
    pub calculated_at: i64,
    pub expires_at: i64,
    pub payload: Vec<u8>,
}

/// Pointer to the current version of a fingerprint.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
pub struct StoredEntry {
    pub fingerprint: [u8; 32],
    pub current_version: u64,
    pub expires_at: i64,
}
