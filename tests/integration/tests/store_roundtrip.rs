//! File-store persistence integration tests.
//!
//! These verify that records written through the store survive a reopen with
//! their content, metadata, and embedding intact, and that mutations are
//! durable before the call returns.

use casafind_retrieval::{EmbeddingRecord, FileVectorStore, VectorStore};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_record_survives_reopen_with_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = FileVectorStore::new(path.clone()).unwrap();
        let record = EmbeddingRecord::with_id(
            "project-42",
            "Riverside towers, 2BR apartments from 1.2B VND",
            vec![0.6, 0.8],
        )
        .with_metadata("type", json!("PROJECT"))
        .with_metadata("slug", json!("riverside-towers"))
        .with_metadata("priceRange", json!("1.2B-3.4B"));
        store.upsert(record).await.unwrap();
    }

    let store = FileVectorStore::new(path).unwrap();
    let loaded = store.get("project-42").await.unwrap().unwrap();
    assert_eq!(loaded.content, "Riverside towers, 2BR apartments from 1.2B VND");
    assert_eq!(loaded.embedding, vec![0.6, 0.8]);
    assert_eq!(loaded.metadata.get("slug"), Some(&json!("riverside-towers")));
    assert_eq!(loaded.metadata.get("type"), Some(&json!("PROJECT")));
}

#[tokio::test]
async fn test_upsert_replacement_is_durable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = FileVectorStore::new(path.clone()).unwrap();
        store
            .upsert(EmbeddingRecord::with_id("listing-1", "old text", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(EmbeddingRecord::with_id("listing-1", "new text", vec![0.0, 1.0]))
            .await
            .unwrap();
    }

    let store = FileVectorStore::new(path).unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
    let loaded = store.get("listing-1").await.unwrap().unwrap();
    assert_eq!(loaded.content, "new text");
    assert_eq!(loaded.embedding, vec![0.0, 1.0]);
}

#[tokio::test]
async fn test_delete_is_durable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = FileVectorStore::new(path.clone()).unwrap();
        store
            .upsert(EmbeddingRecord::with_id("a", "keep", vec![1.0]))
            .await
            .unwrap();
        store
            .upsert(EmbeddingRecord::with_id("b", "drop", vec![1.0]))
            .await
            .unwrap();
        store.delete("b").await.unwrap();
    }

    let store = FileVectorStore::new(path).unwrap();
    assert!(store.get("a").await.unwrap().is_some());
    assert!(store.get("b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_after_reopen_matches_search_before() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let before;
    {
        let store = FileVectorStore::new(path.clone()).unwrap();
        store
            .upsert(EmbeddingRecord::with_id("a", "Apartment 2BR near Metro", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(EmbeddingRecord::with_id("b", "Villa with garden", vec![0.0, 1.0]))
            .await
            .unwrap();
        before = store.search(&[0.9, 0.1], 2, None).await.unwrap();
    }

    let store = FileVectorStore::new(path).unwrap();
    let after = store.search(&[0.9, 0.1], 2, None).await.unwrap();

    let ids = |results: &[(EmbeddingRecord, f32)]| {
        results.iter().map(|(r, _)| r.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&before), ids(&after));
    assert_eq!(after[0].0.id, "a");
    assert!((after[0].1 - 0.994).abs() < 1e-3);
}
