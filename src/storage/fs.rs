//! File-per-record store: `<root>/<fingerprint hex>/{entry,<version>}.rkyv`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use tracing::debug;

use super::VersionStore;
use super::error::{StorageError, StorageResult};
use super::model::{StoredEntry, StoredVersion};
use crate::hashing::Fingerprint;

const RKYV_EXTENSION: &str = "rkyv";
const ENTRY_STEM: &str = "entry";

#[derive(Debug, Clone)]
pub struct FsVersionStore {
    root: PathBuf,
}

impl FsVersionStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(StorageError::Unavailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn fingerprint_dir(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(fingerprint.to_hex())
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.fingerprint_dir(fingerprint)
            .join(format!("{}.{}", ENTRY_STEM, RKYV_EXTENSION))
    }

    fn version_path(&self, fingerprint: &Fingerprint, version: u64) -> PathBuf {
        self.fingerprint_dir(fingerprint)
            .join(format!("{}.{}", version, RKYV_EXTENSION))
    }

    async fn blocking<T, F>(f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> StorageResult<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| StorageError::Io(format!("storage task failed: {}", e)))?
    }
}

/// Writes `bytes` to `path` through a temp file in the same directory.
fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| StorageError::WriteFailed(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
    Ok(())
}

fn read_aligned(path: &Path) -> StorageResult<Option<AlignedVec>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
    aligned.extend_from_slice(&bytes);
    Ok(Some(aligned))
}

fn corrupt(path: &Path, err: RkyvError) -> StorageError {
    StorageError::Corrupt {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

impl VersionStore for FsVersionStore {
    async fn load_entry(&self, fingerprint: &Fingerprint) -> StorageResult<Option<StoredEntry>> {
        let path = self.entry_path(fingerprint);
        Self::blocking(move || {
            let Some(bytes) = read_aligned(&path)? else {
                return Ok(None);
            };
            rkyv::from_bytes::<StoredEntry, RkyvError>(&bytes)
                .map(Some)
                .map_err(|e| corrupt(&path, e))
        })
        .await
    }

    async fn save_entry(&self, entry: StoredEntry) -> StorageResult<()> {
        let path = self.entry_path(&Fingerprint::from_bytes(entry.fingerprint));
        Self::blocking(move || {
            let bytes = rkyv::to_bytes::<RkyvError>(&entry)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            write_atomic(&path, &bytes)
        })
        .await
    }

    async fn load_version(
        &self,
        fingerprint: &Fingerprint,
        version: u64,
    ) -> StorageResult<Option<StoredVersion>> {
        let path = self.version_path(fingerprint, version);
        Self::blocking(move || {
            let Some(bytes) = read_aligned(&path)? else {
                return Ok(None);
            };
            rkyv::from_bytes::<StoredVersion, RkyvError>(&bytes)
                .map(Some)
                .map_err(|e| corrupt(&path, e))
        })
        .await
    }

    async fn save_version(&self, record: StoredVersion) -> StorageResult<()> {
        let path = self.version_path(&Fingerprint::from_bytes(record.fingerprint), record.version);
        Self::blocking(move || {
            let bytes = rkyv::to_bytes::<RkyvError>(&record)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            write_atomic(&path, &bytes)?;
            debug!(path = %path.display(), "Persisted version");
            Ok(())
        })
        .await
    }

    async fn list_versions(&self, fingerprint: &Fingerprint) -> StorageResult<Vec<u64>> {
        let dir = self.fingerprint_dir(fingerprint);
        Self::blocking(move || {
            if !dir.exists() {
                return Ok(Vec::new());
            }

            let mut versions = Vec::new();
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if let Some(ext) = path.extension()
                    && ext == RKYV_EXTENSION
                    && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                    && let Ok(version) = stem.parse::<u64>()
                {
                    versions.push(version);
                }
            }
            versions.sort_unstable();
            Ok(versions)
        })
        .await
    }

    async fn delete_version(&self, fingerprint: &Fingerprint, version: u64) -> StorageResult<()> {
        let path = self.version_path(fingerprint, version);
        Self::blocking(move || match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
    }
}
