//! Runtime configuration: database location and deck analysis thresholds

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Deck analysis policy thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Decks with fewer cards get a "below minimum size" warning
    pub min_deck_size: u32,
    /// Decks with more cards get an "above recommended size" warning
    pub max_deck_size: u32,
    pub low_cost_min: i64,
    pub low_cost_max: i64,
    /// Minimum share of cards in the low-cost band
    pub low_cost_min_ratio: f64,
    pub high_cost_min: i64,
    pub high_cost_max: i64,
    /// Maximum share of cards in the high-cost band
    pub high_cost_max_ratio: f64,
    pub default_suggestion_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_deck_size: 30,
            max_deck_size: 60,
            low_cost_min: 1,
            low_cost_max: 3,
            low_cost_min_ratio: 0.3,
            high_cost_min: 6,
            high_cost_max: 10,
            high_cost_max_ratio: 0.2,
            default_suggestion_count: 5,
        }
    }
}

/// Top-level config file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Load from a JSON file; missing keys fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Returns the default database path: ~/.local/share/deckwizard/deckwizard.db
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deckwizard")
        .join("deckwizard.db")
}
