use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::VersionStore;
use super::error::{StorageError, StorageResult};
use super::memory::InMemoryVersionStore;
use super::model::{StoredEntry, StoredVersion};
use crate::hashing::Fingerprint;

/// In-memory store with switchable read/write failures.
#[derive(Debug, Default)]
pub struct MockVersionStore {
    inner: InMemoryVersionStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MockVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> StorageResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("mock read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("mock write failure".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl VersionStore for MockVersionStore {
    async fn load_entry(&self, fingerprint: &Fingerprint) -> StorageResult<Option<StoredEntry>> {
        self.check_read()?;
        self.inner.load_entry(fingerprint).await
    }

    async fn save_entry(&self, entry: StoredEntry) -> StorageResult<()> {
        self.check_write()?;
        self.inner.save_entry(entry).await
    }

    async fn load_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> StorageResult<Option<StoredVersion>> {
        self.check_read()?;
        self.inner.load_version(fingerprint, version).await
    }

    async fn save_version(&self, record: StoredVersion) -> StorageResult<()> {
        self.check_write()?;
        self.inner.save_version(record).await
    }

    async fn list_versions(&self, fingerprint: &Fingerprint) -> StorageResult<Vec<u64>> {
        self.check_read()?;
        self.inner.list_versions(fingerprint).await
    }

    async fn delete_version(&self, fingerprint: &Fingerprint, version: u64) -> StorageResult<()> {
        self.check_write()?;
        self.inner.delete_version(fingerprint, version).await
    }
}
