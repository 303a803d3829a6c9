//! Game log: append-only game results and per-deck statistics

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{DeckWizardError, Result};
use crate::models::{GameOutcome, GameResult};

/// Number of games returned in [`DeckStatistics::recent_games`]
pub const RECENT_GAMES: usize = 10;

/// Statistics for one deck
///
/// `games_played` and `win_rate` are the incrementally maintained deck fields;
/// the outcome counts and average length come from scanning the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckStatistics {
    pub games_played: u32,
    pub win_rate: f64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub average_game_length: f64,
    pub recent_games: Vec<GameResult>,
}

impl DeckStatistics {
    /// True when the scanned outcome counts agree with `games_played`
    pub fn is_consistent(&self) -> bool {
        self.wins + self.losses + self.draws == self.games_played
    }
}

/// New game to record
#[derive(Debug, Clone)]
pub struct NewGame<'a> {
    pub deck_id: &'a str,
    pub opponent_deck: &'a str,
    pub result: GameOutcome,
    pub game_length: u32,
    pub notes: &'a str,
}

#[derive(Debug, Clone)]
pub struct GameLog {
    db: Database,
}

impl GameLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a game and fold it into the deck's running win rate
    ///
    /// The append and the statistics update run in one IMMEDIATE transaction,
    /// so concurrent recorders for the same deck are serialised by SQLite and
    /// no increment is lost.
    pub fn record(&self, game: NewGame<'_>) -> Result<GameResult> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM decks WHERE id = ?1)",
            params![game.deck_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DeckWizardError::not_found("Deck", game.deck_id));
        }

        let result = GameResult {
            id: format!("game_{}", Uuid::new_v4().simple()),
            deck_id: game.deck_id.to_string(),
            opponent_deck: game.opponent_deck.to_string(),
            result: game.result,
            game_length: game.game_length,
            date_played: Utc::now(),
            notes: game.notes.to_string(),
        };

        tx.execute(
            "INSERT INTO game_results
             (id, deck_id, opponent_deck, result, game_length, date_played, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &result.id,
                &result.deck_id,
                &result.opponent_deck,
                result.result.as_str(),
                result.game_length,
                result.date_played,
                &result.notes,
            ],
        )?;

        // Right-hand sides see the pre-update values of both columns
        tx.execute(
            "UPDATE decks SET
                win_rate = (win_rate * games_played + ?1) / (games_played + 1),
                games_played = games_played + 1
             WHERE id = ?2",
            params![result.result.win_delta(), &result.deck_id],
        )?;

        tx.commit()?;
        log::info!(
            "Recorded game result: {} for deck {}",
            result.result,
            result.deck_id
        );
        Ok(result)
    }

    /// All logged games for a deck, newest first
    pub fn games_for_deck(&self, deck_id: &str) -> Result<Vec<GameResult>> {
        let conn = self.db.connect()?;
        query_games(&conn, deck_id)
    }

    /// Statistics for a deck, or `None` if the deck does not exist
    ///
    /// The deck row and the log are read in one transaction so both come
    /// from the same snapshot.
    pub fn statistics(&self, deck_id: &str) -> Result<Option<DeckStatistics>> {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction()?;

        let deck_row: Option<(u32, f64)> = tx
            .query_row(
                "SELECT games_played, win_rate FROM decks WHERE id = ?1",
                params![deck_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((games_played, win_rate)) = deck_row else {
            return Ok(None);
        };
        let games = query_games(&tx, deck_id)?;
        tx.commit()?;

        let count = |outcome: GameOutcome| games.iter().filter(|g| g.result == outcome).count() as u32;
        let average_game_length = if games.is_empty() {
            0.0
        } else {
            games.iter().map(|g| f64::from(g.game_length)).sum::<f64>() / games.len() as f64
        };

        let stats = DeckStatistics {
            games_played,
            win_rate,
            wins: count(GameOutcome::Win),
            losses: count(GameOutcome::Loss),
            draws: count(GameOutcome::Draw),
            average_game_length,
            recent_games: games.into_iter().take(RECENT_GAMES).collect(),
        };

        if !stats.is_consistent() {
            log::warn!(
                "Deck {} statistics diverge: games_played={} but log has {} wins, {} losses, {} draws",
                deck_id,
                stats.games_played,
                stats.wins,
                stats.losses,
                stats.draws
            );
        }
        Ok(Some(stats))
    }
}

fn query_games(conn: &Connection, deck_id: &str) -> Result<Vec<GameResult>> {
    let mut stmt = conn.prepare(
        "SELECT id, deck_id, opponent_deck, result, game_length, date_played, notes
         FROM game_results
         WHERE deck_id = ?1
         ORDER BY date_played DESC, rowid DESC",
    )?;
    let rows = stmt
        .query_map(params![deck_id], RawGame::from_row)?
        .collect::<rusqlite::Result<Vec<RawGame>>>()?;
    rows.into_iter().map(RawGame::into_game).collect()
}

/// Row as stored, before the result column is parsed
struct RawGame {
    id: String,
    deck_id: String,
    opponent_deck: Option<String>,
    result: String,
    game_length: u32,
    date_played: chrono::DateTime<Utc>,
    notes: Option<String>,
}

impl RawGame {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawGame {
            id: row.get(0)?,
            deck_id: row.get(1)?,
            opponent_deck: row.get(2)?,
            result: row.get(3)?,
            game_length: row.get(4)?,
            date_played: row.get(5)?,
            notes: row.get(6)?,
        })
    }

    fn into_game(self) -> Result<GameResult> {
        Ok(GameResult {
            result: self.result.parse()?,
            id: self.id,
            deck_id: self.deck_id,
            opponent_deck: self.opponent_deck.unwrap_or_default(),
            game_length: self.game_length,
            date_played: self.date_played,
            notes: self.notes.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[path = "games_tests.rs"]
mod tests;
