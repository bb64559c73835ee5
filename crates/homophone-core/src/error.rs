//! Error taxonomy for index and query operations

use std::fmt;

/// The operation a store failure interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Index,
    Remove,
    Query,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Index => "index",
            Self::Remove => "remove",
            Self::Query => "query",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a search needs a non-empty namespace key")]
    MissingKey,
    /// The store's error, unchanged, tagged with the failed operation.
    #[error("{op} on `{key}` failed: {source}")]
    Store {
        op: Operation,
        key: String,
        #[source]
        source: homophone_store::Error,
    },
}

impl Error {
    pub(crate) fn store(op: Operation, key: &str, source: homophone_store::Error) -> Self {
        tracing::warn!(%op, key, error = %source, "store operation failed");
        Self::Store {
            op,
            key: key.to_string(),
            source,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Store { op, .. } => Some(*op),
            Self::MissingKey => None,
        }
    }

    pub fn store_error(&self) -> Option<&homophone_store::Error> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::MissingKey => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
