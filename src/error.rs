use thiserror::Error;

/// Main error type for kgpath
#[derive(Error, Debug)]
pub enum KgpathError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// A single entity or relationship write was rejected by the store
    #[error("Store write failed: {0}")]
    StoreWrite(String),

    /// Relation type is not a valid identifier
    #[error("Invalid relation type: {0:?}")]
    InvalidRelationType(String),

    /// Raw path cannot be scored (no edges, or nodes/edges misaligned)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Graph store cannot be reached or was lost mid-operation
    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl KgpathError {
    /// Whether this error must abort the current ingestion or query.
    ///
    /// Write rejections and unscorable paths only drop the item they concern.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            KgpathError::StoreWrite(_)
                | KgpathError::InvalidRelationType(_)
                | KgpathError::InvalidPath(_)
        )
    }
}

/// Convenient Result type using KgpathError
pub type Result<T> = std::result::Result<T, KgpathError>;
