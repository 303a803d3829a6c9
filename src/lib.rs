//! Deckwizard - card collection, deck building and game tracking
//!
//! Cards, decks and game results live in a single SQLite database. Decks
//! reference catalog cards by id; the game log is append-only and feeds the
//! running win rate stored on each deck.

pub mod analysis;
pub mod bracket;
pub mod catalog;
pub mod config;
pub mod database;
pub mod decks;
pub mod demo;
pub mod error;
pub mod formats;
pub mod games;
pub mod models;
pub mod web;

pub use analysis::{AnalysisReport, Suggestion};
pub use catalog::CardCatalog;
pub use config::{AnalysisConfig, AppConfig};
pub use database::Database;
pub use decks::DeckStore;
pub use error::{DeckWizardError, Result};
pub use games::{DeckStatistics, GameLog, NewGame};
pub use models::{Card, CardFilter, Deck, GameOutcome, GameResult};
