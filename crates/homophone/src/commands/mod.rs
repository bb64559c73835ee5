pub mod index;
pub mod query;
pub mod remove;
pub mod score;
pub mod version;

use anyhow::Context;
use homophone_core::{Client, Config, Search, SqliteStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default location of the config file when `--config` is not given.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("homophone").join("config.json"))
}

/// Resolve settings: file, then environment, then command-line flags.
pub fn load_config(
    path: Option<&Path>,
    db: Option<PathBuf>,
    namespace: Option<String>,
) -> anyhow::Result<Config> {
    let mut config = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(db) = db {
        config.database = db;
    }
    if let Some(namespace) = namespace {
        config.namespace = namespace;
    }
    config.validate()?;
    Ok(config)
}

pub fn open_search(config: &Config) -> anyhow::Result<Search> {
    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = SqliteStore::open(&config.database)
        .with_context(|| format!("opening {}", config.database.display()))?;
    tracing::debug!(db = %config.database.display(), namespace = %config.namespace, "store opened");

    let search = Client::new(Arc::new(store)).search(config.namespace.clone())?;
    Ok(search)
}

/// Words from the command line as one text.
pub fn joined(words: &[String]) -> String {
    words.join(" ")
}
