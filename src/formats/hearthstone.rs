//! Hearthstone card objects

use serde::Deserialize;

use super::title_case;
use crate::models::{slugify, Card};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearthstoneCard {
    #[serde(default)]
    pub card_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub cost: Option<i64>,
    #[serde(default, rename = "type")]
    pub card_type: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub card_set: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attack: Option<i64>,
    #[serde(default)]
    pub health: Option<i64>,
    #[serde(default)]
    pub mechanics: Vec<String>,
}

impl HearthstoneCard {
    pub fn into_card(self) -> Card {
        Card {
            id: self.card_id.unwrap_or_else(|| slugify(&self.name)),
            cost: self.cost.unwrap_or(0),
            card_type: self.card_type.unwrap_or_else(|| "Unknown".to_string()),
            rarity: title_case(self.rarity.as_deref().unwrap_or("COMMON")),
            set_name: self.card_set.unwrap_or_else(|| "Unknown".to_string()),
            description: self.text.unwrap_or_default(),
            attack: self.attack,
            health: self.health,
            abilities: self.mechanics,
            name: self.name,
        }
    }
}
