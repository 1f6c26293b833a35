//! Vector storage implementations.
//!
//! Both stores keep an id-keyed map guarded by an async read-write lock, so a
//! concurrent search observes either the pre- or post-state of an upsert and
//! never a half-written record. The file-backed store additionally snapshots
//! the map to disk on every mutation before the call returns.

use crate::embeddings::cosine_similarity;
use crate::{EmbeddingRecord, Result, RetrievalError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::warn;

/// Predicate over a record's metadata.
///
/// Applied before ranking and limiting, so `search` returns up to `limit`
/// matching records rather than `limit` raw records that then get filtered.
pub type MetadataFilter = dyn Fn(&HashMap<String, serde_json::Value>) -> bool + Send + Sync;

/// Trait for vector stores.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a record, or replace the existing record with the same id.
    async fn upsert(&self, record: EmbeddingRecord) -> Result<()>;

    /// Upsert multiple records.
    async fn upsert_batch(&self, records: Vec<EmbeddingRecord>) -> Result<()>;

    /// Get a record by id.
    async fn get(&self, id: &str) -> Result<Option<EmbeddingRecord>>;

    /// Delete a record by id. Deleting an absent id is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Return the `limit` records most similar to `query`, best first.
    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(EmbeddingRecord, f32)>>;

    /// Count records.
    async fn count(&self) -> Result<usize>;

    /// Remove every record unconditionally.
    async fn clear(&self) -> Result<()>;
}

/// A record plus the insertion rank used for deterministic tie breaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stored {
    seq: u64,
    record: EmbeddingRecord,
}

/// Shared in-memory shape of both store implementations.
#[derive(Clone, Default)]
struct Inner {
    entries: HashMap<String, Stored>,
    next_seq: u64,
}

impl Inner {
    fn upsert(&mut self, record: EmbeddingRecord) -> Result<()> {
        if record.id.is_empty() {
            return Err(RetrievalError::InvalidArgument(
                "record id must not be empty".to_string(),
            ));
        }
        // Re-upserting an id keeps its original insertion rank.
        let seq = match self.entries.get(&record.id) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.entries.insert(record.id.clone(), Stored { seq, record });
        Ok(())
    }

    fn upsert_batch(&mut self, records: Vec<EmbeddingRecord>) -> Result<()> {
        if records.iter().any(|r| r.id.is_empty()) {
            return Err(RetrievalError::InvalidArgument(
                "record id must not be empty".to_string(),
            ));
        }
        for record in records {
            self.upsert(record)?;
        }
        Ok(())
    }

    fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(EmbeddingRecord, f32)>> {
        if limit == 0 {
            return Err(RetrievalError::InvalidArgument(
                "search limit must be positive".to_string(),
            ));
        }

        // Linear scan; N stays in the hundreds-to-thousands range here.
        let mut scored: Vec<(&Stored, f32)> = self
            .entries
            .values()
            .filter(|stored| filter.map_or(true, |f| f(&stored.record.metadata)))
            .map(|stored| (stored, cosine_similarity(query, &stored.record.embedding)))
            .collect();

        // Descending score; ties fall back to insertion order.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.seq.cmp(&b.0.seq))
        });
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(stored, score)| (stored.record.clone(), score))
            .collect())
    }
}

/// In-memory vector store.
pub struct MemoryVectorStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, record: EmbeddingRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.upsert(record)
    }

    async fn upsert_batch(&self, records: Vec<EmbeddingRecord>) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.upsert_batch(records)
    }

    async fn get(&self, id: &str) -> Result<Option<EmbeddingRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(id).map(|s| s.record.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.entries.remove(id);
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(EmbeddingRecord, f32)>> {
        let inner = self.inner.read().await;
        inner.search(query, limit, filter)
    }

    async fn count(&self) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(inner.entries.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        Ok(())
    }
}

/// File-backed vector store with JSON persistence.
///
/// Every mutation is persisted via an atomic write (write to a temp file,
/// sync, then rename) before the call returns; there is no write-behind.
/// Mutations are staged on a copy of the map and committed only after the
/// snapshot write succeeds, so a failed write leaves the store unchanged.
pub struct FileVectorStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl FileVectorStore {
    /// Open a file-backed store.
    ///
    /// If the snapshot at `path` exists it is loaded; records that fail to
    /// parse are skipped with a warning so one corrupt row cannot block
    /// retrieval. A missing file yields an empty store.
    pub fn new(path: PathBuf) -> Result<Self> {
        let inner = if path.exists() {
            Self::load(&path)?
        } else {
            Inner::default()
        };

        Ok(Self {
            path,
            inner: RwLock::new(inner),
        })
    }

    fn load(path: &Path) -> Result<Inner> {
        let data = std::fs::read_to_string(path)?;
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(&data)?;

        let mut inner = Inner::default();
        for (id, value) in raw {
            match serde_json::from_value::<Stored>(value) {
                Ok(stored) => {
                    inner.next_seq = inner.next_seq.max(stored.seq + 1);
                    inner.entries.insert(id, stored);
                }
                Err(err) => {
                    warn!(id = %id, error = %err, "skipping corrupt record in snapshot");
                }
            }
        }
        Ok(inner)
    }

    /// Atomically persist the given entries to disk.
    ///
    /// The temp file is synced before the rename so the snapshot is
    /// crash-durable, not just rename-atomic.
    fn save(&self, inner: &Inner) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        let data = serde_json::to_string_pretty(&inner.entries)?;
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(data.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn upsert(&self, record: EmbeddingRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        let mut staged = inner.clone();
        staged.upsert(record)?;
        self.save(&staged)?;
        *inner = staged;
        Ok(())
    }

    async fn upsert_batch(&self, records: Vec<EmbeddingRecord>) -> Result<()> {
        let mut inner = self.inner.write().await;
        let mut staged = inner.clone();
        staged.upsert_batch(records)?;
        self.save(&staged)?;
        *inner = staged;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<EmbeddingRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(id).map(|s| s.record.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.entries.contains_key(id) {
            return Ok(());
        }
        let mut staged = inner.clone();
        staged.entries.remove(id);
        self.save(&staged)?;
        *inner = staged;
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(EmbeddingRecord, f32)>> {
        let inner = self.inner.read().await;
        inner.search(query, limit, filter)
    }

    async fn count(&self) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(inner.entries.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        let mut staged = inner.clone();
        staged.entries.clear();
        self.save(&staged)?;
        *inner = staged;
        Ok(())
    }
}
