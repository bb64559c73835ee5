//! On-disk settings for the command-line front end

use crate::query::CombineMode;
use anyhow::{Context, bail};
use homophone_store::Direction;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE: &str = "HOMOPHONE_DB";
pub const ENV_NAMESPACE: &str = "HOMOPHONE_NAMESPACE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the postings.
    pub database: PathBuf,
    pub namespace: String,
    pub combine: CombineMode,
    pub sort: Direction,
    /// Results per query when no explicit window is given.
    pub page_size: Option<usize>,
}

fn default_database() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homophone")
        .join("index.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            namespace: "default".to_string(),
            combine: CombineMode::And,
            sort: Direction::Descending,
            page_size: None,
        }
    }
}

impl Config {
    /// Read a JSON config file. A missing file gives the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Override fields from `HOMOPHONE_DB` and `HOMOPHONE_NAMESPACE`.
    pub fn apply_env(&mut self) {
        if let Some(db) = std::env::var_os(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.database = PathBuf::from(db);
        }
        if let Ok(namespace) = std::env::var(ENV_NAMESPACE) {
            if !namespace.is_empty() {
                self.namespace = namespace;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.namespace.trim().is_empty() {
            bail!("namespace must not be empty");
        }
        if self.page_size == Some(0) {
            bail!("page_size must be at least 1");
        }
        Ok(())
    }
}
