//! Semantic search over indexed content.
//!
//! [`SearchEngine`] is the seam the chat orchestration layer talks to: it
//! embeds the visitor's query, runs the store search with any metadata
//! filters compiled into the pre-ranking predicate, and hands back scored
//! records ready to be injected into the prompt context.

use crate::embeddings::EmbeddingProvider;
use crate::store::{MetadataFilter, VectorStore};
use crate::{EmbeddingRecord, Result, DEFAULT_SEARCH_LIMIT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Search query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Query text.
    pub text: String,

    /// Maximum results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Minimum similarity score; results below it are dropped.
    #[serde(default)]
    pub min_score: f32,

    /// Metadata equality filters (e.g. `type == "PROJECT"`).
    ///
    /// Applied before ranking, so `limit` matching records can come back even
    /// when non-matching records score higher.
    #[serde(default)]
    pub filters: HashMap<String, serde_json::Value>,
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl SearchQuery {
    /// Create a new search query with default limit and no filters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: default_limit(),
            min_score: 0.0,
            filters: HashMap::new(),
        }
    }

    /// Set the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the minimum score threshold.
    pub fn with_min_score(mut self, score: f32) -> Self {
        self.min_score = score;
        self
    }

    /// Add a metadata equality filter.
    pub fn with_filter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.filters.insert(key.into(), value);
        self
    }
}

/// A scored search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matching record.
    pub record: EmbeddingRecord,

    /// Cosine similarity against the query embedding.
    pub score: f32,
}

/// Ties an embedding provider to a vector store.
pub struct SearchEngine {
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl SearchEngine {
    /// Create a new search engine.
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embeddings, store }
    }

    /// Embed `content` and upsert it under a generated id.
    pub async fn index(&self, content: &str) -> Result<String> {
        self.index_with_metadata(content, HashMap::new()).await
    }

    /// Embed `content` and upsert it with the given metadata.
    pub async fn index_with_metadata(
        &self,
        content: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<String> {
        let embedding = self.embeddings.embed_one(content).await?;
        let mut record = EmbeddingRecord::new(content, embedding);
        record.metadata = metadata;
        let id = record.id.clone();
        self.store.upsert(record).await?;
        Ok(id)
    }

    /// Search for content similar to the query text.
    pub async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embeddings.embed_one(&query.text).await?;

        let results = if query.filters.is_empty() {
            self.store
                .search(&query_embedding, query.limit, None)
                .await?
        } else {
            let filters = query.filters.clone();
            let filter = move |meta: &HashMap<String, serde_json::Value>| {
                filters.iter().all(|(key, value)| meta.get(key) == Some(value))
            };
            self.store
                .search(&query_embedding, query.limit, Some(&filter))
                .await?
        };

        Ok(results
            .into_iter()
            .filter(|(_, score)| *score >= query.min_score)
            .map(|(record, score)| SearchResult { record, score })
            .collect())
    }

    /// Delete a record from the index.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await
    }

    /// Clear the whole index.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}
