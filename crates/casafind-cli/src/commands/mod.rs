//! CLI command implementations.

pub mod reindex;
pub mod search;
pub mod store;

use casafind_retrieval::{FileVectorStore, OpenAIEmbeddings};
use std::path::Path;
use std::sync::Arc;

/// Open the file-backed store at `path`.
pub(crate) fn open_store(path: &Path) -> anyhow::Result<Arc<FileVectorStore>> {
    let store = FileVectorStore::new(path.to_path_buf())?;
    Ok(Arc::new(store))
}

/// Build the embedding provider from CLI arguments.
pub(crate) fn provider(api_key: &str, model: &str) -> Arc<OpenAIEmbeddings> {
    Arc::new(OpenAIEmbeddings::new(api_key).with_model(model))
}
