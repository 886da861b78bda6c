//! Error types for the persistence layer.

/// Errors a [`Store`](crate::Store) can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached. Worth retrying.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate key in {collection}: {key}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },

    /// The record the write targeted does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading or writing the snapshot file failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file could not be encoded or decoded.
    #[error("snapshot format error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
