//! Deck export renderings

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Card, Deck};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Mtg,
    Arena,
}

impl ExportFormat {
    /// Parse a format name; anything unrecognised is native JSON
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "mtg" => ExportFormat::Mtg,
            "arena" => ExportFormat::Arena,
            _ => ExportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeckExport {
    Json {
        name: String,
        format: String,
        cards: BTreeMap<String, u32>,
        created_date: DateTime<Utc>,
        last_modified: DateTime<Utc>,
    },
    Mtg {
        name: String,
        format: String,
        mainboard: Vec<String>,
        sideboard: Vec<String>,
    },
    Arena {
        deck: String,
    },
}

/// Render `deck` using the catalog cards it resolves to
///
/// Text formats list only resolved cards.
pub fn export_deck(deck: &Deck, resolved: &[(Card, u32)], format: ExportFormat) -> DeckExport {
    match format {
        ExportFormat::Json => DeckExport::Json {
            name: deck.name.clone(),
            format: deck.format.clone(),
            cards: deck.cards.clone(),
            created_date: deck.created_date,
            last_modified: deck.last_modified,
        },
        ExportFormat::Mtg => DeckExport::Mtg {
            name: deck.name.clone(),
            format: deck.format.clone(),
            mainboard: resolved
                .iter()
                .map(|(card, qty)| format!("{} {}", qty, card.name))
                .collect(),
            sideboard: Vec::new(),
        },
        ExportFormat::Arena => DeckExport::Arena {
            deck: resolved
                .iter()
                .map(|(card, qty)| format!("{} {} ({}) {}", qty, card.name, card.set_name, card.id))
                .collect::<Vec<_>>()
                .join("\n"),
        },
    }
}
