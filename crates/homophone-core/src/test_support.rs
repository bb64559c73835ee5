//! A scriptable store for exercising failure and concurrency paths.

use async_trait::async_trait;
use homophone_store::{
    DocId, Error, MemoryStore, Pipeline, Posting, PostingStore, Result, ResultRow,
};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Wraps a [`MemoryStore`], counting calls and failing on demand.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    constraint_delay_ms: AtomicU64,
    constraint_requests: AtomicUsize,
    store_requests: AtomicUsize,
    fail_constraint: AtomicBool,
    fail_insert: AtomicBool,
    fail_delete: AtomicBool,
    fail_aggregate: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constraint_delay_ms(self, ms: u64) -> Self {
        self.constraint_delay_ms.store(ms, Ordering::SeqCst);
        self
    }

    pub fn constraint_requests(&self) -> usize {
        self.constraint_requests.load(Ordering::SeqCst)
    }

    /// Inserts, deletes and aggregations issued so far.
    pub fn store_requests(&self) -> usize {
        self.store_requests.load(Ordering::SeqCst)
    }

    pub fn fail_next_constraint(&self) {
        self.fail_constraint.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_insert(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_aggregate(&self) {
        self.fail_aggregate.store(true, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(Error::Unavailable(format!("{what} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl PostingStore for FlakyStore {
    async fn ensure_unique_constraint(&self, key: &str) -> Result<()> {
        self.constraint_requests.fetch_add(1, Ordering::SeqCst);
        let delay = self.constraint_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Self::check(&self.fail_constraint, "constraint")?;
        self.inner.ensure_unique_constraint(key).await
    }

    async fn insert_postings(&self, key: &str, postings: Vec<Posting>) -> Result<()> {
        self.store_requests.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_insert, "insert")?;
        self.inner.insert_postings(key, postings).await
    }

    async fn delete_postings(&self, key: &str, doc_id: &DocId) -> Result<u64> {
        self.store_requests.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_delete, "delete")?;
        self.inner.delete_postings(key, doc_id).await
    }

    async fn aggregate(&self, key: &str, pipeline: &Pipeline) -> Result<Vec<ResultRow>> {
        self.store_requests.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_aggregate, "aggregate")?;
        self.inner.aggregate(key, pipeline).await
    }
}
