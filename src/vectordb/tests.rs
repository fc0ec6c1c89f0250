use super::*;

fn record(code: &str, title: &str, family: &str, embedding: Vec<f32>) -> ReferenceJobRecord {
    ReferenceJobRecord::new(ReferenceJob::new(code, title, family), embedding)
}

fn seeded_index() -> InMemoryReferenceIndex {
    let index = InMemoryReferenceIndex::new(3);
    index
        .insert_all(vec![
            record("ENG-01", "Software Engineer", "Engineering", vec![1.0, 0.0, 0.0]),
            record("ENG-02", "Data Engineer", "Engineering", vec![0.8, 0.6, 0.0]),
            record("FIN-01", "Accountant", "Finance", vec![0.0, 0.0, 1.0]),
        ])
        .expect("seed");
    index
}

#[test]
fn test_cosine_similarity_basics() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
}

#[tokio::test]
async fn test_nearest_ranks_by_similarity() {
    let index = seeded_index();

    let hits = index.nearest(&[1.0, 0.1, 0.0], None, 5).await.expect("search");

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].job.code, "ENG-01");
    assert_eq!(hits[1].job.code, "ENG-02");
    assert!(hits[0].similarity >= hits[1].similarity);
    assert!(hits.iter().all(|h| (0.0..=1.0).contains(&h.similarity)));
}

#[tokio::test]
async fn test_nearest_respects_family_filter() {
    let index = seeded_index();

    let hits = index
        .nearest(&[1.0, 0.0, 0.0], Some("finance"), 5)
        .await
        .expect("search");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].job.code, "FIN-01");
}

#[tokio::test]
async fn test_nearest_unknown_family_is_empty() {
    let index = seeded_index();
    let hits = index
        .nearest(&[1.0, 0.0, 0.0], Some("Culinary"), 5)
        .await
        .expect("search");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_nearest_truncates_to_k() {
    let index = seeded_index();
    let hits = index.nearest(&[1.0, 0.0, 0.0], None, 1).await.expect("search");
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_nearest_clamps_negative_similarity() {
    let index = seeded_index();
    let hits = index.nearest(&[-1.0, 0.0, 0.0], None, 5).await.expect("search");
    assert!(hits.iter().all(|h| h.similarity >= 0.0));
}

#[tokio::test]
async fn test_nearest_skips_non_finite_similarity() {
    let index = seeded_index();
    let hits = index
        .nearest(&[f32::NAN, 0.0, 0.0], None, 5)
        .await
        .expect("search");
    assert!(hits.is_empty());

    index
        .upsert(record("BAD-01", "Broken", "Engineering", vec![f32::INFINITY, 0.0, 0.0]))
        .expect("upsert");
    let hits = index.nearest(&[1.0, 0.0, 0.0], None, 5).await.expect("search");
    assert!(hits.iter().all(|h| h.job.code != "BAD-01"));
    assert_eq!(hits[0].job.code, "ENG-01");
}

#[tokio::test]
async fn test_nearest_rejects_wrong_dimension() {
    let index = seeded_index();
    let err = index.nearest(&[1.0, 0.0], None, 5).await.unwrap_err();
    assert!(matches!(
        err,
        VectorDbError::InvalidDimension {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn test_upsert_rejects_wrong_dimension() {
    let index = InMemoryReferenceIndex::new(3);
    let err = index
        .upsert(record("X", "X", "X", vec![1.0]))
        .unwrap_err();
    assert!(matches!(err, VectorDbError::InvalidDimension { .. }));
    assert!(index.is_empty());
}

#[test]
fn test_insert_all_rejects_duplicate_codes() {
    let index = InMemoryReferenceIndex::new(1);
    let err = index
        .insert_all(vec![
            record("DUP", "A", "F", vec![1.0]),
            record("DUP", "B", "F", vec![1.0]),
        ])
        .unwrap_err();
    assert!(matches!(err, VectorDbError::DuplicateCode { .. }));
    assert!(index.is_empty());
}

#[test]
fn test_upsert_replaces_by_code() {
    let index = InMemoryReferenceIndex::new(1);
    index.upsert(record("A", "Old", "F", vec![1.0])).unwrap();
    index.upsert(record("A", "New", "F", vec![1.0])).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.get("A").unwrap().job.title, "New");
}

#[test]
fn test_point_id_is_stable() {
    assert_eq!(point_id_for_code("ENG-01"), point_id_for_code("ENG-01"));
    assert_ne!(point_id_for_code("ENG-01"), point_id_for_code("ENG-02"));
}

#[test]
fn test_in_family_is_case_insensitive() {
    let job = ReferenceJob::new("A", "Analyst", "Finance ");
    assert!(job.in_family("finance"));
    assert!(!job.in_family("engineering"));
}
