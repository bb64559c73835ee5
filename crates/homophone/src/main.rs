mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries results, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut out = std::io::stdout().lock();

    let command = match cli.command {
        Commands::Version => return commands::version::run(&mut out),
        command => command,
    };

    let config = commands::load_config(cli.config.as_deref(), cli.db, cli.namespace)?;
    let search = commands::open_search(&config)?;

    match command {
        Commands::Index { id, text } => commands::index::run(&search, id, &text).await,
        Commands::Remove { id } => commands::remove::run(&search, id).await,
        Commands::Query(args) => commands::query::run(&search, &config, args, &mut out).await,
        Commands::Score { id, text } => commands::score::run(&search, id, &text, &mut out).await,
        Commands::Version => commands::version::run(&mut out),
    }
}
