use serde_json::Value;
use thiserror::Error;

/// All possible errors in the fixture tooling
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Fixture database not found: {path}")]
    FixtureMissing { path: String },

    #[error("Failed to create fixtures directory: {path}")]
    DirCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove existing fixture: {path}")]
    StaleFixture {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy fixture database to {path}")]
    CopyFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No users found after schema migration; fixture cannot be created")]
    NoSeedUser,

    #[error("Failed to insert into {table}")]
    InsertFailed {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Export failed: archive was empty")]
    EmptyExport,

    #[error("Check failed: {description} (expected {expected}, found {actual})")]
    CheckFailed {
        description: String,
        expected: Value,
        actual: Value,
    },

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FixtureError>;
