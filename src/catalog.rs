//! Card catalog: card definitions keyed by identifier

use rusqlite::{params, OptionalExtension, Row};

use crate::database::Database;
use crate::error::Result;
use crate::models::{Card, CardFilter};

const CARD_COLUMNS: &str =
    "id, name, cost, card_type, rarity, set_name, description, attack, health, abilities";

/// Lookup and search over the `cards` table
#[derive(Debug, Clone)]
pub struct CardCatalog {
    db: Database,
}

impl CardCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert the card, or fully replace an existing card with the same id
    pub fn upsert(&self, card: &Card) -> Result<()> {
        let conn = self.db.connect()?;
        let abilities = serde_json::to_string(&card.abilities)?;
        conn.execute(
            "INSERT INTO cards
             (id, name, cost, card_type, rarity, set_name, description, attack, health, abilities)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name        = excluded.name,
                cost        = excluded.cost,
                card_type   = excluded.card_type,
                rarity      = excluded.rarity,
                set_name    = excluded.set_name,
                description = excluded.description,
                attack      = excluded.attack,
                health      = excluded.health,
                abilities   = excluded.abilities",
            params![
                &card.id,
                &card.name,
                card.cost,
                &card.card_type,
                &card.rarity,
                &card.set_name,
                &card.description,
                card.attack,
                card.health,
                abilities,
            ],
        )?;
        log::info!("Upserted card: {} ({})", card.name, card.id);
        Ok(())
    }

    pub fn get(&self, card_id: &str) -> Result<Option<Card>> {
        let conn = self.db.connect()?;
        let sql = format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS);
        let raw = conn
            .query_row(&sql, params![card_id], RawCard::from_row)
            .optional()?;
        raw.map(RawCard::into_card).transpose()
    }

    /// Search with AND-combined optional predicates, in storage order
    ///
    /// Type, rarity and cost are matched by SQLite. The name is a literal,
    /// Unicode case-insensitive substring match applied to the returned rows.
    pub fn search(&self, filter: &CardFilter) -> Result<Vec<Card>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {} FROM cards
             WHERE (?1 IS NULL OR card_type = ?1)
               AND (?2 IS NULL OR rarity = ?2)
               AND (?3 IS NULL OR cost = ?3)
             ORDER BY rowid",
            CARD_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![filter.card_type, filter.rarity, filter.cost],
                RawCard::from_row,
            )?
            .collect::<rusqlite::Result<Vec<RawCard>>>()?;

        let cards = rows
            .into_iter()
            .filter(|raw| filter.matches_name(&raw.card.name))
            .map(RawCard::into_card)
            .collect::<Result<Vec<Card>>>()?;
        if filter.is_empty() {
            log::debug!("Listed {} cards", cards.len());
        } else {
            log::debug!("Card search {:?} matched {} cards", filter, cards.len());
        }
        Ok(cards)
    }

    /// Every card in the catalog
    pub fn list(&self) -> Result<Vec<Card>> {
        self.search(&CardFilter::default())
    }
}

/// Row as stored, before the abilities column is decoded
struct RawCard {
    card: Card,
    abilities: Option<String>,
}

impl RawCard {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawCard {
            card: Card {
                id: row.get(0)?,
                name: row.get(1)?,
                cost: row.get(2)?,
                card_type: row.get(3)?,
                rarity: row.get(4)?,
                set_name: row.get(5)?,
                description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                attack: row.get(7)?,
                health: row.get(8)?,
                abilities: Vec::new(),
            },
            abilities: row.get(9)?,
        })
    }

    fn into_card(self) -> Result<Card> {
        let mut card = self.card;
        if let Some(json) = self.abilities.filter(|s| !s.is_empty()) {
            card.abilities = serde_json::from_str(&json)?;
        }
        Ok(card)
    }
}
