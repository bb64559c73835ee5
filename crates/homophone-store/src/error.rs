//! Store errors

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
