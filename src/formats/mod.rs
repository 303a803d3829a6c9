//! Third-party card and deck interchange formats
//!
//! Import accepts native JSON card records, Scryfall-style MTG objects and
//! Hearthstone objects. Export renders a deck as native JSON, an MTG
//! mainboard list or an MTG Arena text block.

mod export;
mod hearthstone;
mod mtg;

pub use export::{export_deck, DeckExport, ExportFormat};
pub use hearthstone::HearthstoneCard;
pub use mtg::ScryfallCard;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::CardCatalog;
use crate::error::Result;
use crate::models::Card;

/// Source format of an import batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Mtg,
    Hearthstone,
}

impl ImportFormat {
    /// Parse a format name; anything unrecognised is treated as native JSON
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "mtg" => ImportFormat::Mtg,
            "hearthstone" => ImportFormat::Hearthstone,
            _ => ImportFormat::Json,
        }
    }

    /// Convert one source record into a catalog card
    pub fn parse_card(&self, record: &Value) -> Result<Card> {
        let card = match self {
            ImportFormat::Json => serde_json::from_value::<Card>(record.clone())?,
            ImportFormat::Mtg => serde_json::from_value::<ScryfallCard>(record.clone())?.into_card(),
            ImportFormat::Hearthstone => {
                serde_json::from_value::<HearthstoneCard>(record.clone())?.into_card()
            }
        };
        Ok(card)
    }
}

/// Outcome of an import batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub imported_count: usize,
    pub errors: Vec<String>,
}

/// Parse and upsert every record; failures are collected, not fatal
pub fn import_cards(catalog: &CardCatalog, format: ImportFormat, records: &[Value]) -> ImportReport {
    let mut report = ImportReport::default();

    for record in records {
        let card = match format.parse_card(record) {
            Ok(card) => card,
            Err(e) => {
                log::warn!("Skipping unparseable {:?} card: {}", format, e);
                report.errors.push(format!("Error parsing card: {}", e));
                continue;
            }
        };

        match catalog.upsert(&card) {
            Ok(()) => report.imported_count += 1,
            Err(e) => {
                log::error!("Failed to import card {}: {}", card.name, e);
                report
                    .errors
                    .push(format!("Failed to add card: {}: {}", card.name, e));
            }
        }
    }

    log::info!(
        "Imported {} cards ({} errors)",
        report.imported_count,
        report.errors.len()
    );
    report
}

/// Python-style title case: "mythic rare" -> "Mythic Rare", "COMMON" -> "Common"
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Read an attack/health style stat that may be a number or a numeric string
pub(crate) fn stat_value(value: &Option<Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_catalog() -> (CardCatalog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(temp_dir.path().join("test.db")).unwrap();
        (CardCatalog::new(db), temp_dir)
    }

    #[test]
    fn title_case_matches_expected() {
        assert_eq!(title_case("common"), "Common");
        assert_eq!(title_case("COMMON"), "Common");
        assert_eq!(title_case("mythic rare"), "Mythic Rare");
        assert_eq!(title_case("free_card"), "Free_Card");
    }

    #[test]
    fn stat_value_accepts_numbers_and_strings() {
        assert_eq!(stat_value(&Some(json!(3))), Some(3));
        assert_eq!(stat_value(&Some(json!("4"))), Some(4));
        assert_eq!(stat_value(&Some(json!("*"))), None);
        assert_eq!(stat_value(&None), None);
    }

    #[test]
    fn unknown_format_falls_back_to_json() {
        assert_eq!(ImportFormat::parse("MTG"), ImportFormat::Mtg);
        assert_eq!(ImportFormat::parse("hearthstone"), ImportFormat::Hearthstone);
        assert_eq!(ImportFormat::parse("yugioh"), ImportFormat::Json);
    }

    #[test]
    fn import_native_json_cards() {
        let (catalog, _dir) = test_catalog();
        let records = vec![json!({
            "id": "fire_bolt",
            "name": "Fire Bolt",
            "cost": 1,
            "card_type": "Spell",
            "rarity": "Common",
            "set_name": "Core Set",
            "description": "Deal 3 damage"
        })];

        let report = import_cards(&catalog, ImportFormat::Json, &records);
        assert_eq!(report.imported_count, 1);
        assert!(report.errors.is_empty());
        assert_eq!(catalog.get("fire_bolt").unwrap().unwrap().cost, 1);
    }

    #[test]
    fn import_collects_errors_and_keeps_going() {
        let (catalog, _dir) = test_catalog();
        let records = vec![
            json!({"name": "Missing Everything"}),
            json!({"name": "Lightning Bolt", "cmc": 1.0, "type_line": "Instant"}),
        ];

        let report = import_cards(&catalog, ImportFormat::Mtg, &records);
        assert_eq!(report.imported_count, 2);

        let report = import_cards(&catalog, ImportFormat::Json, &records);
        assert_eq!(report.imported_count, 0);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("Error parsing card"));
    }
}
