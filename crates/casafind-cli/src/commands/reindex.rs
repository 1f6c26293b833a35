//! Re-index command: rebuild the store from a content export.

use async_trait::async_trait;
use casafind_retrieval::{ContentSource, Reindexer, Result, SourceDocument};
use clap::Args;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reindex command arguments.
#[derive(Args)]
pub struct ReindexArgs {
    /// JSON file holding an array of {id, content, metadata} documents
    pub source: PathBuf,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Embedding model
    #[arg(long, default_value = "text-embedding-3-small")]
    pub model: String,
}

/// One document in the export file.
#[derive(Debug, Clone, Deserialize)]
struct ExportedDocument {
    id: String,
    content: String,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

/// Content source backed by a JSON export of the CMS database.
pub struct JsonContentSource {
    path: PathBuf,
}

impl JsonContentSource {
    /// Create a source reading from the given export file.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ContentSource for JsonContentSource {
    async fn documents(&self) -> Result<Vec<SourceDocument>> {
        let data = std::fs::read_to_string(&self.path)?;
        let exported: Vec<ExportedDocument> = serde_json::from_str(&data)?;
        Ok(exported
            .into_iter()
            .map(|doc| SourceDocument {
                id: doc.id,
                content: doc.content,
                metadata: doc.metadata,
            })
            .collect())
    }
}

/// Run the reindex command.
pub async fn run(store_path: &Path, args: ReindexArgs) -> anyhow::Result<()> {
    debug!(
        source = %args.source.display(),
        store = %store_path.display(),
        model = %args.model,
        "re-indexing content export"
    );

    let store = super::open_store(store_path)?;
    let embeddings = super::provider(&args.api_key, &args.model);

    let source = JsonContentSource::new(args.source);
    let reindexer = Reindexer::new(embeddings, store);
    let report = reindexer.run(&source).await?;

    println!(
        "Re-index complete: {} indexed, {} failed",
        report.indexed, report.failed
    );
    Ok(())
}
