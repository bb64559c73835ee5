use super::joined;
use homophone_core::{DocId, Search};
use std::io::Write;

pub async fn run(
    search: &Search,
    id: DocId,
    words: &[String],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let score = search.query(joined(words)).score(id).await?;
    writeln!(out, "{score}")?;
    Ok(())
}
