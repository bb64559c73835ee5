//! Client handles and the per-namespace indexer

use crate::error::{Error, Operation, Result};
use crate::guard::ConstraintGuard;
use crate::query::Query;
use homophone_store::{DocId, Posting, PostingStore};
use homophone_text::{Normalizer, count_tokens};
use std::fmt;
use std::sync::Arc;

/// Shared entry point: one store, one normalizer, one constraint guard.
///
/// Cloning is cheap and clones share the guard, so a namespace's constraint
/// is created once no matter how many searches point at it.
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn PostingStore>,
    guard: Arc<ConstraintGuard>,
    normalizer: Arc<Normalizer>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("guard", &self.guard)
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(store: Arc<dyn PostingStore>) -> Self {
        Self {
            store,
            guard: Arc::new(ConstraintGuard::new()),
            normalizer: Arc::new(Normalizer::english()),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Open the search namespace `key`. Fails fast on an empty key.
    pub fn search(&self, key: impl Into<String>) -> Result<Search> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::MissingKey);
        }
        Ok(Search {
            key: key.into(),
            client: self.clone(),
        })
    }

    pub fn store(&self) -> &Arc<dyn PostingStore> {
        &self.store
    }

    pub fn guard(&self) -> &ConstraintGuard {
        &self.guard
    }
}

/// An index namespace: indexes and removes documents, starts queries.
#[derive(Clone, Debug)]
pub struct Search {
    key: Arc<str>,
    client: Client,
}

impl Search {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.client.normalizer
    }

    pub(crate) fn store(&self) -> &dyn PostingStore {
        self.client.store.as_ref()
    }

    /// Make sure the namespace's `(token, doc)` constraint exists before
    /// touching its postings.
    pub(crate) async fn ready(&self, op: Operation) -> Result<()> {
        self.client
            .guard
            .ensure(self.store(), &self.key)
            .await
            .map_err(|e| Error::store(op, &self.key, e))
    }

    /// Index `text` under `id`, one posting per distinct token.
    ///
    /// Text without searchable words writes nothing. Indexing an id again
    /// without removing it first adds to the stored frequencies.
    pub async fn index(&self, text: &str, id: impl Into<DocId>) -> Result<()> {
        let id = id.into();
        let tokens = self.normalizer().canonicalize(text, true);
        if tokens.is_empty() {
            tracing::debug!(key = %self.key, doc = %id, "no tokens to index");
            return Ok(());
        }

        let postings: Vec<Posting> = count_tokens(&tokens)
            .into_iter()
            .map(|(token, frequency)| Posting {
                token,
                doc_id: id.clone(),
                frequency,
            })
            .collect();

        self.ready(Operation::Index).await?;
        let count = postings.len();
        self.store()
            .insert_postings(&self.key, postings)
            .await
            .map_err(|e| Error::store(Operation::Index, &self.key, e))?;

        tracing::debug!(key = %self.key, doc = %id, postings = count, "indexed document");
        Ok(())
    }

    /// Remove every posting of `id`. Removing an unknown id succeeds.
    pub async fn remove(&self, id: impl Into<DocId>) -> Result<()> {
        let id = id.into();
        self.ready(Operation::Remove).await?;
        let removed = self
            .store()
            .delete_postings(&self.key, &id)
            .await
            .map_err(|e| Error::store(Operation::Remove, &self.key, e))?;

        tracing::debug!(key = %self.key, doc = %id, removed, "removed document");
        Ok(())
    }

    /// Start a query over this namespace.
    pub fn query(&self, text: impl Into<String>) -> Query {
        Query::new(self.clone(), text.into())
    }
}
