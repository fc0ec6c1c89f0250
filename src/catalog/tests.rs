use super::*;
use crate::embedding::{HashingEmbedder, MockEmbedder};
use crate::vectordb::ReferenceIndex;

const CATALOG: &str = r#"{
  "jobs": [
    { "code": "ENG-SWE", "title": "Software Engineer", "family": "Engineering",
      "embedding": [1.0, 0.0, 0.0] },
    { "code": "FIN-ACC", "title": "Accountant", "family": "Finance", "level": "IC2" }
  ],
  "sources": [
    { "name": "survey", "priority": 1.0, "ttl_secs": 3600, "freshness_window_days": 14,
      "observations": [
        { "code": "ENG-SWE", "location": "Singapore", "sample_size": 50, "recency_days": 5,
          "percentiles": { "p10": 70000, "p25": 85000, "p50": 100000, "p75": 115000, "p90": 130000 } }
      ] },
    { "name": "job-board", "priority": 0.8, "ttl_secs": 1800 }
  ],
  "locations": { "Singapore": 1.2 }
}"#;

#[test]
fn test_parse_catalog() {
    let catalog = Catalog::from_json(CATALOG).unwrap();

    assert_eq!(catalog.jobs.len(), 2);
    assert_eq!(catalog.jobs[1].level.as_deref(), Some("IC2"));
    assert_eq!(catalog.sources[0].freshness_window_days, Some(14));
    assert!(catalog.sources[1].observations.is_empty());
}

#[test]
fn test_rejects_duplicate_codes() {
    let json = r#"{ "jobs": [
        { "code": "A", "title": "A", "family": "F" },
        { "code": "A", "title": "B", "family": "F" } ] }"#;
    assert!(matches!(
        Catalog::from_json(json),
        Err(CatalogError::Invalid { .. })
    ));
}

#[test]
fn test_rejects_bad_source_and_location() {
    let zero_priority = r#"{ "sources": [{ "name": "s", "priority": 0.0, "ttl_secs": 10 }] }"#;
    assert!(Catalog::from_json(zero_priority).is_err());

    let zero_ttl = r#"{ "sources": [{ "name": "s", "priority": 1.0, "ttl_secs": 0 }] }"#;
    assert!(Catalog::from_json(zero_ttl).is_err());

    let bad_location = r#"{ "locations": { "Atlantis": -1.0 } }"#;
    assert!(Catalog::from_json(bad_location).is_err());
}

#[test]
fn test_malformed_json_is_parse_error() {
    assert!(matches!(
        Catalog::from_json("{ not json"),
        Err(CatalogError::Parse(_))
    ));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Catalog::from_path(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, CatalogError::Read { .. }));
}

#[test]
fn test_from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, CATALOG).unwrap();

    assert_eq!(Catalog::from_path(&path).unwrap().sources.len(), 2);
}

#[tokio::test]
async fn test_build_index_uses_stored_and_computed_vectors() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let embedder = MockEmbedder::new(3).with_vector("Accountant", vec![0.0, 0.0, 1.0]);

    let index = catalog.build_index(&embedder).await.unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(embedder.calls(), 1);
    let hits = index.nearest(&[0.0, 0.0, 1.0], None, 1).await.unwrap();
    assert_eq!(hits[0].job.code, "FIN-ACC");
    assert_eq!(hits[0].job.level.as_deref(), Some("IC2"));
}

#[tokio::test]
async fn test_build_index_rejects_wrong_stored_dimension() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let embedder = HashingEmbedder::new(8);

    let err = catalog.build_index(&embedder).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Index(VectorDbError::InvalidDimension { .. })
    ));
}

#[tokio::test]
async fn test_market_sources_and_locations() {
    let catalog = Catalog::from_json(CATALOG).unwrap();

    let sources = catalog.market_sources();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].name(), "survey");
    assert_eq!(sources[0].freshness_window_days(), 14);
    assert_eq!(sources[1].ttl(), Duration::from_secs(1800));

    let observation = sources[0].query("ENG-SWE", "singapore").await.unwrap();
    assert_eq!(observation.unwrap().sample_size, 50);
    assert!(sources[1].query("ENG-SWE", "Singapore").await.unwrap().is_none());

    assert_eq!(catalog.location_index().get("Singapore"), Some(1.2));
}
