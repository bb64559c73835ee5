//! In-process posting store

use crate::pipeline::Pipeline;
use crate::types::{DocId, Posting, ResultRow};
use crate::{PostingStore, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Collection {
    unique: bool,
    rows: Vec<Posting>,
    /// Row index per `(token, doc)`, kept only once the collection is unique.
    positions: HashMap<(String, DocId), usize>,
}

impl Collection {
    fn insert(&mut self, posting: Posting) {
        if self.unique {
            let slot = (posting.token.clone(), posting.doc_id.clone());
            if let Some(&index) = self.positions.get(&slot) {
                self.rows[index].frequency += posting.frequency;
                return;
            }
            self.positions.insert(slot, self.rows.len());
        }
        self.rows.push(posting);
    }

    fn make_unique(&mut self) {
        let rows = std::mem::take(&mut self.rows);
        self.unique = true;
        self.positions.clear();
        for row in rows {
            self.insert(row);
        }
    }

    fn remove_doc(&mut self, doc_id: &DocId) -> u64 {
        let before = self.rows.len();
        self.rows.retain(|row| row.doc_id != *doc_id);
        let removed = before - self.rows.len();
        if self.unique && removed > 0 {
            self.positions = self
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| ((row.token.clone(), row.doc_id.clone()), index))
                .collect();
        }
        removed as u64
    }
}

/// A [`PostingStore`] held in memory.
///
/// Until [`PostingStore::ensure_unique_constraint`] runs for a namespace,
/// repeated `(token, doc)` inserts are kept as separate rows. Afterwards an
/// insert for an existing pair adds to its frequency.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows in `key`.
    pub fn len(&self, key: &str) -> usize {
        self.collections.read().get(key).map_or(0, |c| c.rows.len())
    }

    pub fn is_empty(&self, key: &str) -> bool {
        self.len(key) == 0
    }

    /// Snapshot of the rows in `key`.
    pub fn postings(&self, key: &str) -> Vec<Posting> {
        self.collections
            .read()
            .get(key)
            .map(|c| c.rows.clone())
            .unwrap_or_default()
    }

    pub fn has_unique_constraint(&self, key: &str) -> bool {
        self.collections.read().get(key).is_some_and(|c| c.unique)
    }
}

#[async_trait]
impl PostingStore for MemoryStore {
    async fn ensure_unique_constraint(&self, key: &str) -> Result<()> {
        let mut collections = self.collections.write();
        let collection = collections.entry(key.to_string()).or_default();
        if !collection.unique {
            // Fold rows written before the constraint existed.
            collection.make_unique();
        }
        Ok(())
    }

    async fn insert_postings(&self, key: &str, postings: Vec<Posting>) -> Result<()> {
        let mut collections = self.collections.write();
        let collection = collections.entry(key.to_string()).or_default();
        for posting in postings {
            collection.insert(posting);
        }
        Ok(())
    }

    async fn delete_postings(&self, key: &str, doc_id: &DocId) -> Result<u64> {
        let mut collections = self.collections.write();
        let Some(collection) = collections.get_mut(key) else {
            return Ok(0);
        };
        Ok(collection.remove_doc(doc_id))
    }

    async fn aggregate(&self, key: &str, pipeline: &Pipeline) -> Result<Vec<ResultRow>> {
        let collections = self.collections.read();
        Ok(collections
            .get(key)
            .map(|c| pipeline.evaluate(&c.rows))
            .unwrap_or_default())
    }
}
