use super::joined;
use homophone_core::{DocId, Search};

pub async fn run(search: &Search, id: DocId, words: &[String]) -> anyhow::Result<()> {
    search.index(&joined(words), id.clone()).await?;
    tracing::info!(namespace = search.key(), doc = %id, "indexed");
    Ok(())
}
