//! Error types for deckwizard

use thiserror::Error;

/// Unified error type for catalog, deck and game operations
#[derive(Debug, Error)]
pub enum DeckWizardError {
    /// Referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// Caller supplied a value the operation cannot accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// SQLite rejected the write (primary key, foreign key, NOT NULL, ...)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    /// Database could not be opened or a query failed
    #[error("Storage error: {0}")]
    Storage(#[source] rusqlite::Error),
    /// A stored or submitted JSON document could not be (de)serialized
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    /// Filesystem error (database directory, config file, log file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeckWizardError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DeckWizardError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DeckWizardError::NotFound { .. })
    }
}

impl From<rusqlite::Error> for DeckWizardError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DeckWizardError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| code.to_string()),
                )
            }
            other => DeckWizardError::Storage(other),
        }
    }
}

/// Result alias for deckwizard operations
pub type Result<T> = std::result::Result<T, DeckWizardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = DeckWizardError::not_found("Deck", "deck_123");
        assert_eq!(err.to_string(), "Deck not found: deck_123");
        assert!(err.is_not_found());
    }

    #[test]
    fn constraint_failures_are_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: DeckWizardError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, DeckWizardError::ConstraintViolation(_)));
    }

    #[test]
    fn other_sqlite_failures_are_storage_errors() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: DeckWizardError = conn
            .execute("SELECT * FROM missing_table", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, DeckWizardError::Storage(_)));
    }
}
