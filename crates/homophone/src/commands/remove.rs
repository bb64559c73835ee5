use homophone_core::{DocId, Search};

pub async fn run(search: &Search, id: DocId) -> anyhow::Result<()> {
    search.remove(id.clone()).await?;
    tracing::info!(namespace = search.key(), doc = %id, "removed");
    Ok(())
}
