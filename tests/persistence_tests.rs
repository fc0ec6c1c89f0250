//! Version history persisted through the file-backed store.

mod common;

use std::sync::Arc;

use paygrade::cache::CacheStatus;
use paygrade::storage::{FsVersionStore, MockVersionStore, VersionStore};

use common::fixtures::{embedder, engine, swe_request};

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let first = {
        let store = FsVersionStore::open(dir.path()).unwrap();
        let engine = engine(Arc::new(embedder()), store).await;
        engine.recommend(&swe_request()).await.unwrap()
    };

    let embedder = Arc::new(embedder());
    let store = FsVersionStore::open(dir.path()).unwrap();
    let engine = engine(Arc::clone(&embedder), store).await;
    let (again, status) = engine.recommend_with_status(&swe_request()).await.unwrap();

    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(again, first);
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_refresh_after_reopen_continues_numbering() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FsVersionStore::open(dir.path()).unwrap();
        let engine = engine(Arc::new(embedder()), store).await;
        engine.recommend(&swe_request()).await.unwrap();
        engine
            .recommend(&swe_request().force_refresh(true))
            .await
            .unwrap();
    }

    let store = FsVersionStore::open(dir.path()).unwrap();
    let engine = engine(Arc::new(embedder()), store).await;
    let outcome = engine
        .recommend(&swe_request().force_refresh(true))
        .await
        .unwrap();

    assert_eq!(outcome.recommendation().unwrap().version, 3);
    let versions = engine
        .cache()
        .versions(&swe_request().fingerprint())
        .await
        .unwrap();
    assert_eq!(versions, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_pruned_versions_are_removed_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsVersionStore::open(dir.path()).unwrap();
    let engine = engine(Arc::new(embedder()), store).await;
    let fingerprint = swe_request().fingerprint();

    for _ in 0..7 {
        engine
            .recommend(&swe_request().force_refresh(true))
            .await
            .unwrap();
    }

    let reopened = FsVersionStore::open(dir.path()).unwrap();
    assert_eq!(
        reopened.list_versions(&fingerprint).await.unwrap(),
        vec![3, 4, 5, 6, 7]
    );
    assert!(reopened.load_version(&fingerprint, 2).await.unwrap().is_none());
    assert_eq!(
        reopened
            .load_entry(&fingerprint)
            .await
            .unwrap()
            .unwrap()
            .current_version,
        7
    );
}

#[tokio::test]
async fn test_unwritable_store_still_answers() {
    let store = MockVersionStore::new();
    store.set_fail_writes(true);
    let engine = engine(Arc::new(embedder()), store).await;

    let (outcome, status) = engine.recommend_with_status(&swe_request()).await.unwrap();

    assert_eq!(status, CacheStatus::Uncached);
    assert_eq!(outcome.recommendation().unwrap().version, 1);
    assert!(
        engine
            .cache()
            .entry(&swe_request().fingerprint())
            .await
            .unwrap()
            .is_none()
    );
}
