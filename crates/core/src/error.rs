use std::path::PathBuf;

use crate::domain::PermissionLevel;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("library path does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("library path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("a review session is already active")]
    SessionAlreadyActive,

    #[error("no review session is active")]
    NoActiveSession,

    #[error("month not found: {0}")]
    UnknownMonth(String),

    #[error("photo access is {0}; allow full access in system settings to delete photos")]
    PermissionInsufficient(PermissionLevel),

    #[error("stored record `{key}` is corrupt: {source}")]
    CorruptRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("state database schema v{db} is newer than supported v{code}")]
    SchemaTooNew { db: u32, code: u32 },

    #[error("asset source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, Error>;
