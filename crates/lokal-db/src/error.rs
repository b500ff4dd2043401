//! Database-specific error types and conversions.

use std::fmt;

use lokal_core::error::LokalError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Stored row is invalid: {0}")]
    InvalidRow(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify a failed statement. Unique index violations become
    /// [`DbError::Conflict`].
    pub(crate) fn from_statement(err: impl fmt::Display) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Conflict(message)
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for LokalError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LokalError::NotFound { entity, id },
            DbError::Conflict(message) => LokalError::AlreadyExists { entity: message },
            other => LokalError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_already_exists() {
        let err = DbError::from_statement(
            "Database index `idx_site_slug` already contains 'szentendre'",
        );
        assert!(matches!(
            LokalError::from(err),
            LokalError::AlreadyExists { .. }
        ));
    }

    #[test]
    fn other_statement_errors_map_to_database() {
        let err = DbError::from_statement("Found NONE for field `name`");
        assert!(matches!(LokalError::from(err), LokalError::Database(_)));
    }
}
