use super::*;
use crate::hashing::Fingerprint;

fn fingerprint(title: &str) -> Fingerprint {
    Fingerprint::compute(title, "Singapore", "tenant-a")
}

fn version(fp: &Fingerprint, n: u64) -> StoredVersion {
    StoredVersion {
        fingerprint: *fp.as_bytes(),
        version: n,
        calculated_at: 1_700_000_000_000 + n as i64,
        expires_at: 1_700_000_360_000,
        payload: format!("{{\"version\":{}}}", n).into_bytes(),
    }
}

fn entry(fp: &Fingerprint, current_version: u64) -> StoredEntry {
    StoredEntry {
        fingerprint: *fp.as_bytes(),
        current_version,
        expires_at: 1_700_000_360_000,
    }
}

async fn exercise_store<S: VersionStore>(store: &S) {
    let fp = fingerprint("Software Engineer");
    let other = fingerprint("Accountant");

    assert!(store.load_entry(&fp).await.unwrap().is_none());
    assert!(store.list_versions(&fp).await.unwrap().is_empty());

    for n in [2, 1, 3] {
        store.save_version(version(&fp, n)).await.unwrap();
    }
    store.save_entry(entry(&fp, 3)).await.unwrap();
    store.save_version(version(&other, 1)).await.unwrap();

    assert_eq!(store.list_versions(&fp).await.unwrap(), vec![1, 2, 3]);
    assert_eq!(store.load_entry(&fp).await.unwrap(), Some(entry(&fp, 3)));
    assert_eq!(
        store.load_version(&fp, 2).await.unwrap(),
        Some(version(&fp, 2))
    );
    assert!(store.load_version(&fp, 9).await.unwrap().is_none());

    store.delete_version(&fp, 1).await.unwrap();
    store.delete_version(&fp, 1).await.unwrap();
    assert_eq!(store.list_versions(&fp).await.unwrap(), vec![2, 3]);
    assert_eq!(store.list_versions(&other).await.unwrap(), vec![1]);

    store.save_entry(entry(&fp, 4)).await.unwrap();
    assert_eq!(
        store.load_entry(&fp).await.unwrap().map(|e| e.current_version),
        Some(4)
    );
}

#[tokio::test]
async fn test_in_memory_store_contract() {
    let store = InMemoryVersionStore::new();
    exercise_store(&store).await;
    assert_eq!(store.fingerprint_count(), 1);
}

#[tokio::test]
async fn test_fs_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsVersionStore::open(dir.path().join("versions")).unwrap();
    exercise_store(&store).await;
}

#[tokio::test]
async fn test_backend_enum_delegates() {
    let store = StoreBackend::Memory(InMemoryVersionStore::new());
    exercise_store(&store).await;
}

#[tokio::test]
async fn test_fs_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let fp = fingerprint("Data Engineer");

    {
        let store = FsVersionStore::open(dir.path()).unwrap();
        store.save_version(version(&fp, 1)).await.unwrap();
        store.save_entry(entry(&fp, 1)).await.unwrap();
    }

    let reopened = FsVersionStore::open(dir.path()).unwrap();
    assert_eq!(reopened.load_entry(&fp).await.unwrap(), Some(entry(&fp, 1)));
    assert_eq!(
        reopened.load_version(&fp, 1).await.unwrap(),
        Some(version(&fp, 1))
    );
}

#[tokio::test]
async fn test_fs_store_reports_corrupt_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsVersionStore::open(dir.path()).unwrap();
    let fp = fingerprint("Broken");

    let fp_dir = dir.path().join(fp.to_hex());
    std::fs::create_dir_all(&fp_dir).unwrap();
    std::fs::write(fp_dir.join("entry.rkyv"), b"not an archive").unwrap();

    let err = store.load_entry(&fp).await.unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
}

#[tokio::test]
async fn test_fs_store_ignores_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsVersionStore::open(dir.path()).unwrap();
    let fp = fingerprint("Analyst");

    store.save_version(version(&fp, 7)).await.unwrap();
    let fp_dir = dir.path().join(fp.to_hex());
    std::fs::write(fp_dir.join("notes.txt"), b"x").unwrap();
    std::fs::write(fp_dir.join("abc.rkyv"), b"x").unwrap();

    assert_eq!(store.list_versions(&fp).await.unwrap(), vec![7]);
}

#[test]
fn test_fs_store_rejects_file_root() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = FsVersionStore::open(file.path()).unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
}

#[tokio::test]
async fn test_mock_store_failure_injection() {
    let store = MockVersionStore::new();
    let fp = fingerprint("Chef");

    store.set_fail_writes(true);
    assert!(store.save_version(version(&fp, 1)).await.is_err());
    assert_eq!(store.writes(), 0);

    store.set_fail_writes(false);
    store.save_version(version(&fp, 1)).await.unwrap();
    assert_eq!(store.writes(), 1);

    store.set_fail_reads(true);
    assert!(matches!(
        store.load_version(&fp, 1).await,
        Err(StorageError::Unavailable(_))
    ));
}
