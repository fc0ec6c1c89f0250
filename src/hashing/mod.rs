//! Text normalisation and BLAKE3-based keys.
//!
//! - [`Fingerprint`] identifies a cacheable recommendation request.
//! - [`hash_text`] keys the embedding memo cache.

use blake3::{Hash, Hasher};
use serde::{Deserialize, Serialize};

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Stable cache key for a (title, location, requester) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Computes the fingerprint of a request.
    ///
    /// Title and location are normalised with [`normalize_text`]; the requester id is
    /// used verbatim so two principals never share a cached result.
    pub fn compute(title: &str, location: &str, requester_id: &str) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(normalize_text(title).as_bytes());
        hasher.update(b"|");
        hasher.update(normalize_text(location).as_bytes());
        hasher.update(b"|");
        hasher.update(requester_id.as_bytes());
        hasher.finalize().into()
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn as_hash(&self) -> Hash {
        Hash::from_bytes(self.0)
    }

    pub fn to_hex(&self) -> String {
        self.as_hash().to_hex().to_string()
    }

    /// Parses the output of [`Fingerprint::to_hex`].
    pub fn from_hex(hex: &str) -> Option<Self> {
        Hash::from_hex(hex).ok().map(Self::from)
    }

    /// First 12 hex characters, for log fields.
    pub fn short(&self) -> String {
        self.as_hash().to_hex()[..12].to_string()
    }
}

impl From<Hash> for Fingerprint {
    fn from(hash: Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hash().to_hex())
    }
}
