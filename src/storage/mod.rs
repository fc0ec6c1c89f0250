//! Version history persistence.
//!
//! A [`VersionStore`] keeps, per fingerprint, a set of immutable [`StoredVersion`]s and one
//! [`StoredEntry`] pointing at the current version. Callers write the version before the
//! pointer, so a reader never follows a pointer to a missing version.

pub mod error;
pub mod fs;
pub mod memory;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod model;

#[cfg(test)]
mod tests;

pub use error::{StorageError, StorageResult};
pub use fs::FsVersionStore;
pub use memory::InMemoryVersionStore;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVersionStore;
pub use model::{ArchivedStoredEntry, ArchivedStoredVersion, StoredEntry, StoredVersion};

use std::future::Future;
use std::sync::Arc;

use crate::hashing::Fingerprint;

pub trait VersionStore: Send + Sync {
    fn load_entry(
        &self,
        fingerprint: &Fingerprint,
    ) -> impl Future<Output = StorageResult<Option<StoredEntry>>> + Send;

    fn save_entry(&self, entry: StoredEntry) -> impl Future<Output = StorageResult<()>> + Send;

    fn load_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> impl Future<Output = StorageResult<Option<StoredVersion>>> + Send;

    fn save_version(&self, record: StoredVersion)
    -> impl Future<Output = StorageResult<()>> + Send;

    /// Stored version numbers, ascending.
    fn list_versions(
        &self,
        fingerprint: &Fingerprint,
    ) -> impl Future<Output = StorageResult<Vec<u64>>> + Send;

    /// Deleting a missing version is not an error.
    fn delete_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> impl Future<Output = StorageResult<()>> + Send;
}

impl<S: VersionStore> VersionStore for Arc<S> {
    fn load_entry(
        &self,
        fingerprint: &Fingerprint,
    ) -> impl Future<Output = StorageResult<Option<StoredEntry>>> + Send {
        (**self).load_entry(fingerprint)
    }

    fn save_entry(&self, entry: StoredEntry) -> impl Future<Output = StorageResult<()>> + Send {
        (**self).save_entry(entry)
    }

    fn load_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> impl Future<Output = StorageResult<Option<StoredVersion>>> + Send {
        (**self).load_version(fingerprint, version)
    }

    fn save_version(
        &self,
        record: StoredVersion,
    ) -> impl Future<Output = StorageResult<()>> + Send {
        (**self).save_version(record)
    }

    fn list_versions(
        &self,
        fingerprint: &Fingerprint,
    ) -> impl Future<Output = StorageResult<Vec<u64>>> + Send {
        (**self).list_versions(fingerprint)
    }

    fn delete_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> impl Future<Output = StorageResult<()>> + Send {
        (**self).delete_version(fingerprint, version)
    }
}

/// Runtime-selected store.
#[derive(Debug)]
pub enum StoreBackend {
    Memory(InMemoryVersionStore),
    Fs(FsVersionStore),
}

impl VersionStore for StoreBackend {
    async fn load_entry(&self, fingerprint: &Fingerprint) -> StorageResult<Option<StoredEntry>> {
        match self {
            StoreBackend::Memory(s) => s.load_entry(fingerprint).await,
            StoreBackend::Fs(s) => s.load_entry(fingerprint).await,
        }
    }

    async fn save_entry(&self, entry: StoredEntry) -> StorageResult<()> {
        match self {
            StoreBackend::Memory(s) => s.save_entry(entry).await,
            StoreBackend::Fs(s) => s.save_entry(entry).await,
        }
    }

    async fn load_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> StorageResult<Option<StoredVersion>> {
        match self {
            StoreBackend::Memory(s) => s.load_version(fingerprint, version).await,
            StoreBackend::Fs(s) => s.load_version(fingerprint, version).await,
        }
    }

    async fn save_version(&self, record: StoredVersion) -> StorageResult<()> {
        match self {
            StoreBackend::Memory(s) => s.save_version(record).await,
            StoreBackend::Fs(s) => s.save_version(record).await,
        }
    }

    async fn list_versions(&self, fingerprint: &Fingerprint) -> StorageResult<Vec<u64>> {
        match self {
            StoreBackend::Memory(s) => s.list_versions(fingerprint).await,
            StoreBackend::Fs(s) => s.list_versions(fingerprint).await,
        }
    }

    async fn delete_version(&self, fingerprint: &Fingerprint, version: u64) -> StorageResult<()> {
        match self {
            StoreBackend::Memory(s) => s.delete_version(fingerprint, version).await,
            StoreBackend::Fs(s) => s.delete_version(fingerprint, version).await,
        }
    }
}
