//! Embedding store and similarity retrieval for Casafind.
//!
//! This crate provides:
//! - Embedding generation via the OpenAI API
//! - Durable vector storage with upsert/search/clear semantics
//! - Semantic search over indexed real-estate content
//! - The re-index workflow that rebuilds the store from CMS content

pub mod embeddings;
pub mod error;
pub mod reindex;
pub mod search;
pub mod store;

pub use embeddings::{EmbeddingProvider, OpenAIEmbeddings};
pub use error::RetrievalError;
pub use reindex::{ContentSource, ReindexReport, Reindexer, SourceDocument};
pub use search::{SearchEngine, SearchQuery, SearchResult};
pub use store::{FileVectorStore, MemoryVectorStore, MetadataFilter, VectorStore};

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Number of results a search returns when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// A content record with its precomputed embedding.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EmbeddingRecord {
    /// Unique identifier; an upsert with the same id replaces the record.
    pub id: String,

    /// The source text that was embedded.
    pub content: String,

    /// Vector embedding produced by an embedding provider.
    pub embedding: Vec<f32>,

    /// Open metadata (type, slug, title, price, ...). Opaque to the store.
    pub metadata: std::collections::HashMap<String, serde_json::Value>,

    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EmbeddingRecord {
    /// Create a record with a generated id.
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), content, embedding)
    }

    /// Create a record with a caller-supplied id.
    pub fn with_id(
        id: impl Into<String>,
        content: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding,
            metadata: std::collections::HashMap::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
