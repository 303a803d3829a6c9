//! Scryfall-style MTG card objects

use serde::Deserialize;
use serde_json::Value;

use super::{stat_value, title_case};
use crate::models::{slugify, Card};

/// Subset of a Scryfall card object used for import
#[derive(Debug, Deserialize)]
pub struct ScryfallCard {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Converted mana cost; Scryfall sends it as a float
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    /// Strings like "2" or "*" on Scryfall
    #[serde(default)]
    pub power: Option<Value>,
    #[serde(default)]
    pub toughness: Option<Value>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ScryfallCard {
    pub fn into_card(self) -> Card {
        Card {
            id: self.id.unwrap_or_else(|| slugify(&self.name)),
            cost: self.cmc.map(|c| c.round() as i64).unwrap_or(0),
            card_type: self.type_line.unwrap_or_else(|| "Unknown".to_string()),
            rarity: title_case(self.rarity.as_deref().unwrap_or("common")),
            set_name: self.set_name.unwrap_or_else(|| "Unknown".to_string()),
            description: self.oracle_text.unwrap_or_default(),
            attack: stat_value(&self.power),
            health: stat_value(&self.toughness),
            abilities: self.keywords,
            name: self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scryfall_card_with_metadata() {
        let card_json = r#"{
            "name": "Lightning Bolt",
            "cmc": 1.0,
            "set_name": "Ravnica: Clue Edition",
            "type_line": "Instant",
            "mana_cost": "{R}",
            "rarity": "uncommon",
            "oracle_text": "Lightning Bolt deals 3 damage to any target.",
            "keywords": []
        }"#;

        let card = serde_json::from_str::<ScryfallCard>(card_json)
            .unwrap()
            .into_card();
        assert_eq!(card.id, "lightning_bolt");
        assert_eq!(card.cost, 1);
        assert_eq!(card.card_type, "Instant");
        assert_eq!(card.rarity, "Uncommon");
        assert_eq!(card.set_name, "Ravnica: Clue Edition");
        assert_eq!(card.description, "Lightning Bolt deals 3 damage to any target.");
        assert_eq!(card.attack, None);
    }

    #[test]
    fn scryfall_creature_stats_and_keywords() {
        let card_json = r#"{
            "id": "goblin-guide-m12",
            "name": "Goblin Guide",
            "cmc": 1,
            "type_line": "Creature - Goblin Scout",
            "rarity": "rare",
            "power": "2",
            "toughness": "2",
            "keywords": ["Haste"]
        }"#;

        let card = serde_json::from_str::<ScryfallCard>(card_json)
            .unwrap()
            .into_card();
        assert_eq!(card.id, "goblin-guide-m12");
        assert_eq!(card.attack, Some(2));
        assert_eq!(card.health, Some(2));
        assert_eq!(card.abilities, vec!["Haste".to_string()]);
    }

    #[test]
    fn scryfall_minimal_card_uses_defaults() {
        let card = serde_json::from_str::<ScryfallCard>(r#"{"name": "Test Card"}"#)
            .unwrap()
            .into_card();
        assert_eq!(card.id, "test_card");
        assert_eq!(card.cost, 0);
        assert_eq!(card.card_type, "Unknown");
        assert_eq!(card.rarity, "Common");
        assert_eq!(card.set_name, "Unknown");
    }

    #[test]
    fn variable_power_is_dropped() {
        let card = serde_json::from_str::<ScryfallCard>(
            r#"{"name": "Tarmogoyf", "power": "*", "toughness": "1+*"}"#,
        )
        .unwrap()
        .into_card();
        assert_eq!(card.attack, None);
        assert_eq!(card.health, None);
    }
}
