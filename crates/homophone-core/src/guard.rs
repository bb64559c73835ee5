//! One-time uniqueness-constraint setup per namespace
//!
//! Each namespace owns a `tokio::sync::OnceCell`. The cell moves from empty to
//! initializing when the first caller starts the store request; callers that
//! arrive meanwhile wait on that single request instead of issuing their own.
//! On success the cell is ready for the rest of the process. On failure it
//! falls back to empty, the error goes to the caller that ran the request, and
//! the next waiter retries.

use homophone_store::{PostingStore, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Default)]
pub struct ConstraintGuard {
    namespaces: Mutex<HashMap<String, Arc<OnceCell<()>>>>,
}

impl ConstraintGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, key: &str) -> Arc<OnceCell<()>> {
        let mut namespaces = self.namespaces.lock();
        Arc::clone(namespaces.entry(key.to_string()).or_default())
    }

    /// Run `store.ensure_unique_constraint(key)` unless it already succeeded.
    pub async fn ensure(&self, store: &dyn PostingStore, key: &str) -> Result<()> {
        let cell = self.cell(key);
        if cell.initialized() {
            return Ok(());
        }

        cell.get_or_try_init(|| async {
            store.ensure_unique_constraint(key).await?;
            tracing::info!(key, "unique constraint ready");
            Ok::<(), homophone_store::Error>(())
        })
        .await?;
        Ok(())
    }

    /// Whether the constraint for `key` is known to exist.
    pub fn is_ready(&self, key: &str) -> bool {
        self.namespaces
            .lock()
            .get(key)
            .is_some_and(|cell| cell.initialized())
    }
}
