//! Full re-embed workflow.
//!
//! Triggered by an administrator after bulk content edits: clear the store,
//! then walk every publishable document, embed its descriptive text, and
//! upsert the result. A single document failing to embed is counted and
//! logged, never aborts the batch. The store may be briefly empty or
//! partially repopulated while this runs; concurrent searches just see
//! fewer results.

use crate::embeddings::EmbeddingProvider;
use crate::store::VectorStore;
use crate::{EmbeddingRecord, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A document to be embedded and indexed.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Stable id for the record (e.g. `"project-42"`).
    pub id: String,

    /// Descriptive text to embed.
    pub content: String,

    /// Metadata carried through to the stored record.
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Supplies the documents to index; stands in for the CMS database walk.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Every document that should be in the index.
    async fn documents(&self) -> Result<Vec<SourceDocument>>;
}

/// Per-entity outcome counts for one re-index run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Documents embedded and upserted.
    pub indexed: usize,

    /// Documents whose embedding failed and were skipped.
    pub failed: usize,
}

/// Rebuilds the store from a content source.
pub struct Reindexer {
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Reindexer {
    /// Create a new reindexer.
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embeddings, store }
    }

    /// Clear the store and repopulate it from `source`.
    pub async fn run(&self, source: &dyn ContentSource) -> Result<ReindexReport> {
        let documents = source.documents().await?;
        info!(total = documents.len(), "starting re-index");

        self.store.clear().await?;

        let mut report = ReindexReport::default();
        for doc in documents {
            match self.embeddings.embed_one(&doc.content).await {
                Ok(embedding) => {
                    let mut record = EmbeddingRecord::with_id(doc.id, doc.content, embedding);
                    record.metadata = doc.metadata;
                    self.store.upsert(record).await?;
                    report.indexed += 1;
                }
                Err(err) => {
                    warn!(id = %doc.id, error = %err, "skipping document, embedding failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            indexed = report.indexed,
            failed = report.failed,
            "re-index complete"
        );
        Ok(report)
    }
}
