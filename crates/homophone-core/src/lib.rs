//! Phonetic full-text search over a pluggable posting store

mod config;
mod engine;
mod error;
mod guard;
mod query;
mod search;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{Error, Operation, Result};
pub use guard::ConstraintGuard;
pub use query::{CombineMode, Hit, ParseCombineModeError, Query, QueryOptions};
pub use search::{Client, Search};

pub use homophone_store::{Direction, DocId, MemoryStore, PostingStore, SqliteStore};
pub use homophone_text::Normalizer;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
