use super::joined;
use crate::cli::QueryArgs;
use homophone_core::{Config, Query, Search};
use std::io::Write;

/// Apply command-line options over the configured defaults.
fn build(search: &Search, config: &Config, args: QueryArgs) -> Query {
    let stop = args
        .stop
        .or_else(|| config.page_size.map(|size| args.start + size));

    search
        .query(joined(&args.text))
        .combine(args.combine.unwrap_or(config.combine))
        .sort(args.sort.unwrap_or(config.sort))
        .between(args.start, stop)
        .min(args.min)
        .max(args.max)
        .include(args.include)
        .exclude(args.exclude)
}

pub async fn run(
    search: &Search,
    config: &Config,
    args: QueryArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let with_scores = args.scores;
    let query = build(search, config, args);

    let json = if with_scores {
        serde_json::to_string(&query.execute().await?)?
    } else {
        serde_json::to_string(&query.ids().await?)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}
