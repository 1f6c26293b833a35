//! End-to-end retrieval pipeline tests: re-index a content export into a
//! file-backed store, then query it through the search engine the way the
//! chat orchestration layer does.

use async_trait::async_trait;
use casafind_integration_tests::HashingEmbeddings;
use casafind_retrieval::{
    ContentSource, FileVectorStore, Reindexer, Result, SearchEngine, SearchQuery, SourceDocument,
    VectorStore,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

struct FixtureSource(Vec<SourceDocument>);

#[async_trait]
impl ContentSource for FixtureSource {
    async fn documents(&self) -> Result<Vec<SourceDocument>> {
        Ok(self.0.clone())
    }
}

fn doc(id: &str, content: &str, kind: &str, title: &str) -> SourceDocument {
    let mut metadata = HashMap::new();
    metadata.insert("type".to_string(), json!(kind));
    metadata.insert("title".to_string(), json!(title));
    SourceDocument {
        id: id.to_string(),
        content: content.to_string(),
        metadata,
    }
}

fn fixture() -> FixtureSource {
    FixtureSource(vec![
        doc(
            "project-1",
            "Riverside towers: 2BR and 3BR apartments near the metro line",
            "PROJECT",
            "Riverside Towers",
        ),
        doc(
            "listing-7",
            "Bright 2BR apartment for rent near the metro, fully furnished",
            "LISTING",
            "2BR near metro",
        ),
        doc(
            "news-3",
            "Quarterly housing market update for the eastern district",
            "NEWS",
            "Market update Q3",
        ),
    ])
}

#[tokio::test]
async fn test_reindex_then_search() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileVectorStore::new(dir.path().join("store.json")).unwrap());
    let embeddings = Arc::new(HashingEmbeddings::default());

    let report = Reindexer::new(embeddings.clone(), store.clone())
        .run(&fixture())
        .await
        .unwrap();
    assert_eq!(report.indexed, 3);
    assert_eq!(report.failed, 0);

    let engine = SearchEngine::new(embeddings, store);
    let results = engine
        .search(SearchQuery::new("2BR apartment for rent near the metro").with_limit(2))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    // Every adjacent pair must be in descending score order.
    assert!(results[0].score >= results[1].score);
}

#[tokio::test]
async fn test_indexed_document_is_its_own_best_match() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileVectorStore::new(dir.path().join("store.json")).unwrap());
    let embeddings = Arc::new(HashingEmbeddings::default());

    Reindexer::new(embeddings.clone(), store.clone())
        .run(&fixture())
        .await
        .unwrap();

    let engine = SearchEngine::new(embeddings, store);
    let results = engine
        .search(SearchQuery::new(
            "Quarterly housing market update for the eastern district",
        ))
        .await
        .unwrap();

    assert_eq!(results[0].record.id, "news-3");
    assert!((results[0].score - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_type_filter_scopes_chat_results() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileVectorStore::new(dir.path().join("store.json")).unwrap());
    let embeddings = Arc::new(HashingEmbeddings::default());

    Reindexer::new(embeddings.clone(), store.clone())
        .run(&fixture())
        .await
        .unwrap();

    let engine = SearchEngine::new(embeddings, store);
    let results = engine
        .search(
            SearchQuery::new("2BR apartment for rent near the metro")
                .with_filter("type", json!("PROJECT")),
        )
        .await
        .unwrap();

    assert!(!results.is_empty());
    for result in &results {
        assert_eq!(result.record.metadata.get("type"), Some(&json!("PROJECT")));
    }
}

#[tokio::test]
async fn test_reindex_twice_does_not_duplicate() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileVectorStore::new(dir.path().join("store.json")).unwrap());
    let embeddings = Arc::new(HashingEmbeddings::default());

    let reindexer = Reindexer::new(embeddings, store.clone());
    reindexer.run(&fixture()).await.unwrap();
    reindexer.run(&fixture()).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_search_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let embeddings = Arc::new(HashingEmbeddings::default());

    {
        let store = Arc::new(FileVectorStore::new(path.clone()).unwrap());
        Reindexer::new(embeddings.clone(), store)
            .run(&fixture())
            .await
            .unwrap();
    }

    // A fresh process opens the same snapshot and can answer queries.
    let store = Arc::new(FileVectorStore::new(path).unwrap());
    let engine = SearchEngine::new(embeddings, store);
    let results = engine
        .search(SearchQuery::new(
            "Riverside towers: 2BR and 3BR apartments near the metro line",
        ))
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].record.id, "project-1");
}
