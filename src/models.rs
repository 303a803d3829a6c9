//! Core record types: cards, decks and game results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DeckWizardError;

/// A single card definition in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub cost: i64,
    pub card_type: String,
    pub rarity: String,
    pub set_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attack: Option<i64>,
    #[serde(default)]
    pub health: Option<i64>,
    #[serde(default)]
    pub abilities: Vec<String>,
}

impl Card {
    /// Build a card with no stats and no abilities
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: i64,
        card_type: impl Into<String>,
        rarity: impl Into<String>,
        set_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            card_type: card_type.into(),
            rarity: rarity.into(),
            set_name: set_name.into(),
            description: description.into(),
            attack: None,
            health: None,
            abilities: Vec::new(),
        }
    }

    pub fn with_stats(mut self, attack: i64, health: i64) -> Self {
        self.attack = Some(attack);
        self.health = Some(health);
        self
    }
}

/// Derive a catalog identifier from a card name: "Fire Bolt" -> "card_fire_bolt"
pub fn card_id_from_name(name: &str) -> String {
    format!("card_{}", slugify(name))
}

/// Lowercase and replace spaces with underscores
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Optional predicates for catalog search, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardFilter {
    /// Case-insensitive substring of the card name
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub rarity: Option<String>,
    pub cost: Option<i64>,
}

impl CardFilter {
    pub fn by_type(card_type: impl Into<String>) -> Self {
        Self {
            card_type: Some(card_type.into()),
            ..Self::default()
        }
    }

    /// Literal, case-insensitive substring test against the name predicate
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.name {
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.card_type.is_none()
            && self.rarity.is_none()
            && self.cost.is_none()
    }
}

/// Largest total number of cards a deck may hold
pub const MAX_DECK_CARDS: u32 = 100_000;

/// A deck: card identifiers mapped to positive quantities plus running stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub format: String,
    pub cards: BTreeMap<String, u32>,
    pub created_date: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub win_rate: f64,
    pub games_played: u32,
}

impl Deck {
    /// Sum of all quantities, saturating at `u32::MAX` for rows edited outside deckwizard
    pub fn total_cards(&self) -> u32 {
        self.cards
            .values()
            .fold(0u32, |total, quantity| total.saturating_add(*quantity))
    }

    pub fn quantity_of(&self, card_id: &str) -> u32 {
        self.cards.get(card_id).copied().unwrap_or(0)
    }

    /// Increment (or insert) the quantity of `card_id`.
    ///
    /// Zero quantities are rejected so the mapping never holds a zero entry, and
    /// the deck total may not exceed [`MAX_DECK_CARDS`].
    pub fn insert_cards(&mut self, card_id: &str, quantity: u32) -> Result<(), DeckWizardError> {
        if quantity == 0 {
            return Err(DeckWizardError::InvalidInput(
                "quantity must be a positive integer".to_string(),
            ));
        }
        let within_limit = self
            .total_cards()
            .checked_add(quantity)
            .is_some_and(|total| total <= MAX_DECK_CARDS);
        if !within_limit {
            return Err(DeckWizardError::InvalidInput(format!(
                "a deck may hold at most {} cards",
                MAX_DECK_CARDS
            )));
        }
        *self.cards.entry(card_id.to_string()).or_insert(0) += quantity;
        self.last_modified = Utc::now();
        Ok(())
    }

    /// Decrement the quantity of `card_id`, dropping the entry when it reaches zero.
    ///
    /// Leaves the deck untouched if the card is not present.
    pub fn take_cards(&mut self, card_id: &str, quantity: u32) -> Result<(), DeckWizardError> {
        if quantity == 0 {
            return Err(DeckWizardError::InvalidInput(
                "quantity must be a positive integer".to_string(),
            ));
        }
        let Some(current) = self.cards.get_mut(card_id) else {
            return Err(DeckWizardError::not_found("Card in deck", card_id));
        };
        if *current <= quantity {
            self.cards.remove(card_id);
        } else {
            *current -= quantity;
        }
        self.last_modified = Utc::now();
        Ok(())
    }
}

/// Outcome of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
}

impl GameOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOutcome::Win => "win",
            GameOutcome::Loss => "loss",
            GameOutcome::Draw => "draw",
        }
    }

    /// Contribution of this outcome to the win count
    pub fn win_delta(&self) -> f64 {
        match self {
            GameOutcome::Win => 1.0,
            GameOutcome::Loss | GameOutcome::Draw => 0.0,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameOutcome {
    type Err = DeckWizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(GameOutcome::Win),
            "loss" => Ok(GameOutcome::Loss),
            "draw" => Ok(GameOutcome::Draw),
            other => Err(DeckWizardError::InvalidInput(format!(
                "unknown game result '{}', expected win, loss or draw",
                other
            ))),
        }
    }
}

/// One logged game, append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub id: String,
    pub deck_id: String,
    pub opponent_deck: String,
    pub result: GameOutcome,
    pub game_length: u32,
    pub date_played: DateTime<Utc>,
    pub notes: String,
}
