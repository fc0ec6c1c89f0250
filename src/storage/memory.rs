use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use super::VersionStore;
use super::error::StorageResult;
use super::model::{StoredEntry, StoredVersion};
use crate::hashing::Fingerprint;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Fingerprint, StoredEntry>,
    versions: HashMap<Fingerprint, BTreeMap<u64, StoredVersion>>,
}

/// Process-local version store.
#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    inner: RwLock<Inner>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprint_count(&self) -> usize {
        self.inner.read().entries.len()
    }
}

impl VersionStore for InMemoryVersionStore {
    async fn load_entry(&self, fingerprint: &Fingerprint) -> StorageResult<Option<StoredEntry>> {
        Ok(self.inner.read().entries.get(fingerprint).copied())
    }

    async fn save_entry(&self, entry: StoredEntry) -> StorageResult<()> {
        self.inner
            .write()
            .entries
            .insert(Fingerprint::from_bytes(entry.fingerprint), entry);
        Ok(())
    }

    async fn load_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> StorageResult<Option<StoredVersion>> {
        Ok(self
            .inner
            .read()
            .versions
            .get(fingerprint)
            .and_then(|v| v.get(&version))
            .cloned())
    }

    async fn save_version(&self, record: StoredVersion) -> StorageResult<()> {
        self.inner
            .write()
            .versions
            .entry(Fingerprint::from_bytes(record.fingerprint))
            .or_default()
            .insert(record.version, record);
        Ok(())
    }

    async fn list_versions(&self, fingerprint: &Fingerprint) -> StorageResult<Vec<u64>> {
        Ok(self
            .inner
            .read()
            .versions
            .get(fingerprint)
            .map(|v| v.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn delete_version(&self, fingerprint: &Fingerprint, version: u64) -> StorageResult<()> {
        if let Some(versions) = self.inner.write().versions.get_mut(fingerprint) {
            versions.remove(&version);
        }
        Ok(())
    }
}
