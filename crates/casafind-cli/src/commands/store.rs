//! Store maintenance commands.

use casafind_retrieval::VectorStore;
use std::path::Path;

/// Remove every record from the store.
pub async fn clear(store_path: &Path) -> anyhow::Result<()> {
    let store = super::open_store(store_path)?;
    store.clear().await?;
    println!("Store cleared.");
    Ok(())
}

/// Print how many records the store holds.
pub async fn count(store_path: &Path) -> anyhow::Result<()> {
    let store = super::open_store(store_path)?;
    println!("{}", store.count().await?);
    Ok(())
}
