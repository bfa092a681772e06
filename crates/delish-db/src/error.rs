//! Database-specific error types and conversions.

use delish_core::error::DelishError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Unique index violations surface from SurrealDB as query errors whose
    /// message names the index that already holds the value.
    fn is_duplicate(&self) -> bool {
        match self {
            DbError::Query(msg) => msg.contains("already contains"),
            _ => false,
        }
    }
}

impl From<DbError> for DelishError {
    fn from(err: DbError) -> Self {
        if err.is_duplicate() {
            return DelishError::AlreadyExists {
                entity: "store".into(),
            };
        }
        match err {
            DbError::NotFound { entity, id } => DelishError::NotFound { entity, id },
            other => DelishError::Database(other.to_string()),
        }
    }
}
