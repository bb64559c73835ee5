use std::io::Write;

pub fn run(out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "homophone {}", homophone_core::VERSION)?;
    writeln!(out, "Phonetic full-text search backed by SQLite")?;
    Ok(())
}
