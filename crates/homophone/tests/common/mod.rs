use homophone_core::{Client, Search, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A search over a fresh SQLite file. Keep the `TempDir` alive for the test.
pub fn sqlite_search(namespace: &str) -> (TempDir, Search) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("index.db")).unwrap();
    let search = Client::new(Arc::new(store)).search(namespace).unwrap();
    (dir, search)
}

pub fn reopen(dir: &TempDir, namespace: &str) -> Search {
    let store = SqliteStore::open(dir.path().join("index.db")).unwrap();
    Client::new(Arc::new(store)).search(namespace).unwrap()
}

pub const CORPUS: [(i64, &str); 4] = [
    (1, "The quick brown fox"),
    (2, "quick quick fox jumps"),
    (3, "brown dog"),
    (4, "a lazy dog sleeps"),
];

pub async fn index_corpus(search: &Search) {
    for (id, text) in CORPUS {
        search.index(text, id).await.unwrap();
    }
}
