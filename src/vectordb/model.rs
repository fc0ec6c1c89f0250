use serde::{Deserialize, Serialize};

/// Descriptive metadata of a reference job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceJob {
    /// Stable taxonomy code (unique within an index).
    pub code: String,
    pub title: String,
    /// Job family, e.g. `engineering`, `finance`.
    pub family: String,
    #[serde(default)]
    pub level: Option<String>,
}

impl ReferenceJob {
    pub fn new(code: impl Into<String>, title: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            family: family.into(),
            level: None,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Case-insensitive family comparison.
    pub fn in_family(&self, family: &str) -> bool {
        self.family.trim().eq_ignore_ascii_case(family.trim())
    }
}

/// A reference job plus its precomputed embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceJobRecord {
    pub job: ReferenceJob,
    pub embedding: Vec<f32>,
}

impl ReferenceJobRecord {
    pub fn new(job: ReferenceJob, embedding: Vec<f32>) -> Self {
        Self { job, embedding }
    }
}

/// One nearest-neighbour search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub job: ReferenceJob,
    /// Cosine similarity clamped into `[0, 1]`.
    pub similarity: f32,
}

/// Point id derived from the reference code.
pub fn point_id_for_code(code: &str) -> u64 {
    let hash = blake3::hash(code.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}
