//! SQLite storage handle and schema
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! A connection is opened per operation and dropped when the operation ends.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// How long a writer waits for SQLite's write lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the deckwizard SQLite database
///
/// Cheap to clone; holds only the file path.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database at `path` and initialise the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                log::info!("Created directory: {}", parent.display());
            }
        }

        let db = Self { path };
        let conn = db.connect()?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        init_schema(&conn)?;
        log::debug!(
            "Opened database: {} (journal_mode={})",
            db.path.display(),
            journal_mode
        );
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection for a single operation
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `cards`: Card catalog, abilities stored as a JSON array
/// - `collection`: Owned copies of catalog cards
/// - `decks`: Deck definitions, card mapping stored as a JSON object
/// - `game_results`: Append-only game log
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            cost INTEGER NOT NULL,
            card_type TEXT NOT NULL,
            rarity TEXT NOT NULL,
            set_name TEXT NOT NULL,
            description TEXT,
            attack INTEGER,
            health INTEGER,
            abilities TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_cards_type ON cards(card_type);

        CREATE TABLE IF NOT EXISTS collection (
            card_id TEXT,
            quantity INTEGER DEFAULT 1,
            condition TEXT DEFAULT 'mint',
            acquired_date TEXT,
            FOREIGN KEY (card_id) REFERENCES cards(id)
        );

        CREATE TABLE IF NOT EXISTS decks (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            format TEXT NOT NULL,
            cards TEXT,
            created_date TEXT,
            last_modified TEXT,
            win_rate REAL DEFAULT 0.0,
            games_played INTEGER DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS game_results (
            id TEXT PRIMARY KEY,
            deck_id TEXT,
            opponent_deck TEXT,
            result TEXT,
            game_length INTEGER,
            date_played TEXT,
            notes TEXT,
            FOREIGN KEY (deck_id) REFERENCES decks(id)
        );

        CREATE INDEX IF NOT EXISTS idx_game_results_deck ON game_results(deck_id);
        ",
    )?;

    log::debug!("Database schema initialized");
    Ok(())
}

/// Count rows in one of the known tables
pub fn count_rows(conn: &Connection, table: Table) -> Result<i64> {
    let sql = match table {
        Table::Cards => "SELECT COUNT(*) FROM cards",
        Table::Decks => "SELECT COUNT(*) FROM decks",
        Table::GameResults => "SELECT COUNT(*) FROM game_results",
    };
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

#[derive(Debug, Clone, Copy)]
pub enum Table {
    Cards,
    Decks,
    GameResults,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_parent_directory_and_tables() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("deckwizard.db");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());

        let conn = db.connect().unwrap();
        for table in ["cards", "collection", "decks", "game_results"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(count_rows(&conn, Table::Cards).unwrap(), 0);
    }

    #[test]
    fn connections_enforce_foreign_keys() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(temp_dir.path().join("test.db")).unwrap();
        let conn = db.connect().unwrap();

        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
