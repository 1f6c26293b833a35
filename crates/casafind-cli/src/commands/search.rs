//! Search command: query the store the way the chat widget does.

use casafind_retrieval::{SearchEngine, SearchQuery};
use clap::Args;
use std::path::Path;
use tracing::debug;

/// Search command arguments.
#[derive(Args)]
pub struct SearchArgs {
    /// Natural-language query
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value_t = casafind_retrieval::DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,

    /// Restrict results to a content type (PROJECT, LISTING, NEWS)
    #[arg(long)]
    pub kind: Option<String>,

    /// Drop results scoring below this threshold
    #[arg(long, default_value_t = 0.0)]
    pub min_score: f32,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Embedding model
    #[arg(long, default_value = "text-embedding-3-small")]
    pub model: String,
}

/// Run the search command.
pub async fn run(store_path: &Path, args: SearchArgs) -> anyhow::Result<()> {
    debug!(
        query = %args.query,
        limit = args.limit,
        kind = ?args.kind,
        "searching store"
    );

    let store = super::open_store(store_path)?;
    let embeddings = super::provider(&args.api_key, &args.model);
    let engine = SearchEngine::new(embeddings, store);

    let mut query = SearchQuery::new(&args.query)
        .with_limit(args.limit)
        .with_min_score(args.min_score);
    if let Some(kind) = &args.kind {
        query = query.with_filter("type", serde_json::json!(kind));
    }

    let results = engine.search(query).await?;
    if results.is_empty() {
        // Mirrors the chat fallback: answer generically instead of failing.
        println!("No matching properties found.");
        return Ok(());
    }

    println!("  {:<8} {:<24} {}", "SCORE", "ID", "TITLE");
    println!("  {}", "-".repeat(60));
    for result in &results {
        let title = result
            .record
            .metadata
            .get("title")
            .or_else(|| result.record.metadata.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or(result.record.content.as_str());
        println!("  {:<8.4} {:<24} {}", result.score, result.record.id, title);
    }
    Ok(())
}
