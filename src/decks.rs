//! Deck store: deck definitions, card quantities and deck analysis
//!
//! Card mutations only rewrite the `cards` and `last_modified` columns so they
//! never overwrite the win statistics maintained by the game log.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::analysis::{analyze_deck, optimize, AnalysisReport, OptimizationKind, ResolvedEntry, Suggestion};
use crate::catalog::CardCatalog;
use crate::config::AnalysisConfig;
use crate::database::Database;
use crate::error::{DeckWizardError, Result};
use crate::models::{Card, CardFilter, Deck};

const DECK_COLUMNS: &str =
    "id, name, format, cards, created_date, last_modified, win_rate, games_played";

/// Deck persistence plus catalog-backed analysis
#[derive(Debug, Clone)]
pub struct DeckStore {
    db: Database,
    catalog: CardCatalog,
    config: AnalysisConfig,
}

impl DeckStore {
    pub fn new(db: Database, config: AnalysisConfig) -> Self {
        let catalog = CardCatalog::new(db.clone());
        Self {
            db,
            catalog,
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Create and persist an empty deck
    pub fn create(&self, name: &str, format: &str) -> Result<Deck> {
        if name.trim().is_empty() {
            return Err(DeckWizardError::InvalidInput(
                "deck name must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let deck = Deck {
            id: format!("deck_{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            format: format.to_string(),
            cards: BTreeMap::new(),
            created_date: now,
            last_modified: now,
            win_rate: 0.0,
            games_played: 0,
        };

        self.save(&deck)?;
        log::info!("Created deck: {} ({})", deck.name, deck.id);
        Ok(deck)
    }

    pub fn load(&self, deck_id: &str) -> Result<Option<Deck>> {
        let conn = self.db.connect()?;
        load_deck(&conn, deck_id)
    }

    /// Load a deck, treating absence as `NotFound`
    pub fn require(&self, deck_id: &str) -> Result<Deck> {
        self.load(deck_id)?
            .ok_or_else(|| DeckWizardError::not_found("Deck", deck_id))
    }

    /// Insert the deck or replace every column of an existing record
    pub fn save(&self, deck: &Deck) -> Result<()> {
        let conn = self.db.connect()?;
        let cards = serde_json::to_string(&deck.cards)?;
        conn.execute(
            "INSERT INTO decks
             (id, name, format, cards, created_date, last_modified, win_rate, games_played)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name          = excluded.name,
                format        = excluded.format,
                cards         = excluded.cards,
                created_date  = excluded.created_date,
                last_modified = excluded.last_modified,
                win_rate      = excluded.win_rate,
                games_played  = excluded.games_played",
            params![
                &deck.id,
                &deck.name,
                &deck.format,
                cards,
                deck.created_date,
                deck.last_modified,
                deck.win_rate,
                deck.games_played,
            ],
        )?;
        log::info!("Saved deck: {}", deck.name);
        Ok(())
    }

    /// All decks, most recently created first
    pub fn list(&self) -> Result<Vec<Deck>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {} FROM decks ORDER BY created_date DESC, rowid DESC",
            DECK_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], RawDeck::from_row)?
            .collect::<rusqlite::Result<Vec<RawDeck>>>()?;
        rows.into_iter().map(RawDeck::into_deck).collect()
    }

    /// Add `quantity` copies of `card_id` and persist
    ///
    /// The change is applied to the stored row, so `deck` is refreshed with
    /// any edits made by other writers. On error `deck` is left as it was.
    pub fn add_card(&self, deck: &mut Deck, card_id: &str, quantity: u32) -> Result<()> {
        let updated = self.update_cards(&deck.id, |d| d.insert_cards(card_id, quantity))?;
        log::info!(
            "Added {}x {} to deck {}",
            quantity,
            card_id,
            updated.name
        );
        *deck = updated;
        Ok(())
    }

    /// Remove `quantity` copies of `card_id` and persist
    ///
    /// Fails with `NotFound` (deck untouched) if the card isn't in the deck.
    pub fn remove_card(&self, deck: &mut Deck, card_id: &str, quantity: u32) -> Result<()> {
        let updated = self.update_cards(&deck.id, |d| d.take_cards(card_id, quantity))?;
        log::info!(
            "Removed {}x {} from deck {}",
            quantity,
            card_id,
            updated.name
        );
        *deck = updated;
        Ok(())
    }

    /// Load, mutate and write back the card mapping in one IMMEDIATE transaction
    ///
    /// Concurrent editors of the same deck are serialised by SQLite's write
    /// lock. Only `cards` and `last_modified` are written.
    fn update_cards<F>(&self, deck_id: &str, mutate: F) -> Result<Deck>
    where
        F: FnOnce(&mut Deck) -> Result<()>,
    {
        let mut conn = self.db.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut deck =
            load_deck(&tx, deck_id)?.ok_or_else(|| DeckWizardError::not_found("Deck", deck_id))?;
        mutate(&mut deck)?;

        let cards = serde_json::to_string(&deck.cards)?;
        tx.execute(
            "UPDATE decks SET cards = ?1, last_modified = ?2 WHERE id = ?3",
            params![cards, deck.last_modified, &deck.id],
        )?;
        tx.commit()?;
        Ok(deck)
    }

    /// Catalog cards the deck refers to, paired with their quantities
    ///
    /// Identifiers with no catalog entry are skipped.
    pub fn resolve_cards(&self, deck: &Deck) -> Result<Vec<(Card, u32)>> {
        let mut resolved = Vec::with_capacity(deck.cards.len());
        for (card_id, quantity) in &deck.cards {
            match self.catalog.get(card_id)? {
                Some(card) => resolved.push((card, *quantity)),
                None => log::debug!("Deck {} references unknown card {}", deck.id, card_id),
            }
        }
        Ok(resolved)
    }

    pub fn analyze(&self, deck: &Deck) -> Result<AnalysisReport> {
        let resolved = self.resolve_cards(deck)?;
        let entries: Vec<ResolvedEntry<'_>> = resolved
            .iter()
            .map(|(card, quantity)| ResolvedEntry {
                card,
                quantity: *quantity,
            })
            .collect();

        let report = analyze_deck(deck, &entries, &self.config);
        if !report.unresolved_cards.is_empty() {
            log::warn!(
                "Deck {} has {} unresolved card reference(s): {:?}",
                deck.id,
                report.unresolved_cards.len(),
                report.unresolved_cards
            );
        }
        Ok(report)
    }

    /// Catalog cards sharing a type with the deck's cards and not already in it
    ///
    /// Types are visited in name order; within a type, catalog order is kept.
    pub fn suggest(&self, deck: &Deck, count: usize) -> Result<Vec<Card>> {
        let existing_types: BTreeSet<String> = self
            .resolve_cards(deck)?
            .into_iter()
            .map(|(card, _)| card.card_type)
            .collect();

        let mut suggestions = Vec::new();
        for card_type in existing_types {
            if suggestions.len() >= count {
                break;
            }
            let candidates = self.catalog.search(&CardFilter::by_type(card_type))?;
            suggestions.extend(
                candidates
                    .into_iter()
                    .filter(|c| !deck.cards.contains_key(&c.id)),
            );
        }

        suggestions.truncate(count);
        Ok(suggestions)
    }

    /// Run an optimiser over the deck's current analysis
    ///
    /// Unknown optimiser names produce no suggestions.
    pub fn optimize(&self, deck: &Deck, kind: &str) -> Result<(Vec<Suggestion>, AnalysisReport)> {
        let report = self.analyze(deck)?;
        let suggestions = match OptimizationKind::parse(kind) {
            Some(kind) => optimize(kind, &report, &self.config),
            None => {
                log::warn!("Unknown optimization type: {}", kind);
                Vec::new()
            }
        };
        Ok((suggestions, report))
    }
}

pub(crate) fn load_deck(conn: &Connection, deck_id: &str) -> Result<Option<Deck>> {
    let sql = format!("SELECT {} FROM decks WHERE id = ?1", DECK_COLUMNS);
    let raw = conn
        .query_row(&sql, params![deck_id], RawDeck::from_row)
        .optional()?;
    raw.map(RawDeck::into_deck).transpose()
}

/// Row as stored, before the card mapping is decoded
struct RawDeck {
    deck: Deck,
    cards: Option<String>,
}

impl RawDeck {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawDeck {
            deck: Deck {
                id: row.get(0)?,
                name: row.get(1)?,
                format: row.get(2)?,
                cards: BTreeMap::new(),
                created_date: row.get(4)?,
                last_modified: row.get(5)?,
                win_rate: row.get(6)?,
                games_played: row.get(7)?,
            },
            cards: row.get(3)?,
        })
    }

    fn into_deck(self) -> Result<Deck> {
        let mut deck = self.deck;
        if let Some(json) = self.cards.filter(|s| !s.is_empty()) {
            deck.cards = serde_json::from_str(&json)?;
        }
        Ok(deck)
    }
}

#[cfg(test)]
#[path = "decks_tests.rs"]
mod tests;
