//! Posting storage: the data model, aggregation pipelines and store backends

mod error;
mod memory;
mod pipeline;
mod sqlite;
mod types;

pub use error::Error;
pub use memory::MemoryStore;
pub use pipeline::{GroupFilter, Pipeline, PostingFilter, Projection, Stage};
pub use sqlite::SqliteStore;
pub use types::{Direction, DocId, ParseDirectionError, Posting, ResultRow};

use async_trait::async_trait;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An aggregation-capable store of postings, partitioned by namespace key.
///
/// Every call is independent; a store must be safe to share between tasks.
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Make sure `(token, doc_id)` is unique within `key`. Idempotent.
    async fn ensure_unique_constraint(&self, key: &str) -> Result<()>;

    /// Write postings. Either every posting is accepted or the call fails.
    async fn insert_postings(&self, key: &str, postings: Vec<Posting>) -> Result<()>;

    /// Delete every posting of `doc_id`, returning how many were removed.
    async fn delete_postings(&self, key: &str, doc_id: &DocId) -> Result<u64>;

    /// Run `pipeline` over the postings of `key`.
    async fn aggregate(&self, key: &str, pipeline: &Pipeline) -> Result<Vec<ResultRow>>;
}
