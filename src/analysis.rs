//! Deck composition analysis and optimisation hints
//!
//! Pure functions over a deck and the catalog cards it resolves to. Card
//! references that don't resolve are skipped by every histogram and listed
//! in [`AnalysisReport::unresolved_cards`].

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::models::{Card, Deck};

/// Result of analysing a deck
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub total_cards: u32,
    /// Card count per cost
    pub mana_curve: BTreeMap<i64, u32>,
    pub card_types: BTreeMap<String, u32>,
    pub rarities: BTreeMap<String, u32>,
    pub recommendations: Vec<String>,
    /// Deck entries with no matching catalog card
    pub unresolved_cards: Vec<String>,
}

impl AnalysisReport {
    /// Number of cards whose cost falls in `min..=max`
    pub fn cards_costing(&self, min: i64, max: i64) -> u32 {
        if min > max {
            return 0;
        }
        self.mana_curve
            .range(min..=max)
            .fold(0u32, |total, (_, count)| total.saturating_add(*count))
    }
}

/// A deck entry resolved against the catalog
pub struct ResolvedEntry<'a> {
    pub card: &'a Card,
    pub quantity: u32,
}

/// Analyse a deck given the catalog cards its entries resolve to
pub fn analyze_deck(
    deck: &Deck,
    resolved: &[ResolvedEntry<'_>],
    config: &AnalysisConfig,
) -> AnalysisReport {
    let mut mana_curve = BTreeMap::new();
    let mut card_types = BTreeMap::new();
    let mut rarities = BTreeMap::new();

    for entry in resolved {
        tally(&mut mana_curve, entry.card.cost, entry.quantity);
        tally(&mut card_types, entry.card.card_type.clone(), entry.quantity);
        tally(&mut rarities, entry.card.rarity.clone(), entry.quantity);
    }

    let unresolved_cards: Vec<String> = deck
        .cards
        .keys()
        .filter(|id| !resolved.iter().any(|e| &e.card.id == *id))
        .cloned()
        .collect();

    let mut report = AnalysisReport {
        total_cards: deck.total_cards(),
        mana_curve,
        card_types,
        rarities,
        recommendations: Vec::new(),
        unresolved_cards,
    };
    report.recommendations = recommendations(&report, config);
    report
}

fn tally<K: Ord>(histogram: &mut BTreeMap<K, u32>, key: K, quantity: u32) {
    let count = histogram.entry(key).or_insert(0);
    *count = count.saturating_add(quantity);
}

fn recommendations(report: &AnalysisReport, config: &AnalysisConfig) -> Vec<String> {
    let mut recs = Vec::new();
    let total = report.total_cards;

    if total < config.min_deck_size {
        recs.push(format!(
            "Deck is below minimum size ({} cards)",
            config.min_deck_size
        ));
    } else if total > config.max_deck_size {
        recs.push(format!(
            "Deck is above recommended size ({} cards)",
            config.max_deck_size
        ));
    }

    let low_cost = report.cards_costing(config.low_cost_min, config.low_cost_max);
    if f64::from(low_cost) < f64::from(total) * config.low_cost_min_ratio {
        recs.push("Consider adding more low-cost cards for early game".to_string());
    }

    recs
}

/// Which optimiser to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationKind {
    ManaCurve,
    CardSynergy,
}

impl OptimizationKind {
    /// Parse an optimiser name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "mana_curve" => Some(OptimizationKind::ManaCurve),
            "card_synergy" => Some(OptimizationKind::CardSynergy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// One optimisation hint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub priority: Priority,
}

/// Produce optimisation hints from an existing analysis
pub fn optimize(
    kind: OptimizationKind,
    report: &AnalysisReport,
    config: &AnalysisConfig,
) -> Vec<Suggestion> {
    match kind {
        OptimizationKind::ManaCurve => optimize_mana_curve(report, config),
        OptimizationKind::CardSynergy => vec![Suggestion {
            kind: "synergy".to_string(),
            message: "Consider adding more cards that synergize with your existing strategy"
                .to_string(),
            priority: Priority::Medium,
        }],
    }
}

fn optimize_mana_curve(report: &AnalysisReport, config: &AnalysisConfig) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let total = f64::from(report.total_cards);

    let high_cost = report.cards_costing(config.high_cost_min, config.high_cost_max);
    if f64::from(high_cost) > total * config.high_cost_max_ratio {
        suggestions.push(Suggestion {
            kind: "reduce_high_cost".to_string(),
            message: format!(
                "Consider reducing high-cost cards ({}+ mana) for better early game",
                config.high_cost_min
            ),
            priority: Priority::High,
        });
    }

    let early_game = report.cards_costing(config.low_cost_min, config.low_cost_max);
    if f64::from(early_game) < total * config.low_cost_min_ratio {
        suggestions.push(Suggestion {
            kind: "add_early_game".to_string(),
            message: format!(
                "Add more low-cost cards ({}-{} mana) for better early game presence",
                config.low_cost_min, config.low_cost_max
            ),
            priority: Priority::High,
        });
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deck_with(entries: &[(&str, u32)]) -> Deck {
        let now = Utc::now();
        Deck {
            id: "deck_a".to_string(),
            name: "A".to_string(),
            format: "Standard".to_string(),
            cards: entries.iter().map(|(id, q)| (id.to_string(), *q)).collect(),
            created_date: now,
            last_modified: now,
            win_rate: 0.0,
            games_played: 0,
        }
    }

    fn card(id: &str, cost: i64, card_type: &str) -> Card {
        Card::new(id, id, cost, card_type, "Common", "Core Set", "")
    }

    fn resolve<'a>(deck: &Deck, cards: &'a [Card]) -> Vec<ResolvedEntry<'a>> {
        cards
            .iter()
            .filter_map(|c| {
                deck.cards.get(&c.id).map(|q| ResolvedEntry {
                    card: c,
                    quantity: *q,
                })
            })
            .collect()
    }

    #[test]
    fn histograms_sum_quantities() {
        let cards = vec![card("a", 1, "Spell"), card("b", 1, "Creature"), card("c", 5, "Creature")];
        let deck = deck_with(&[("a", 4), ("b", 2), ("c", 1)]);
        let report = analyze_deck(&deck, &resolve(&deck, &cards), &AnalysisConfig::default());

        assert_eq!(report.total_cards, 7);
        assert_eq!(report.mana_curve.get(&1), Some(&6));
        assert_eq!(report.mana_curve.get(&5), Some(&1));
        assert_eq!(report.card_types.get("Creature"), Some(&3));
        assert_eq!(report.rarities.get("Common"), Some(&7));
        assert!(report.unresolved_cards.is_empty());
    }

    #[test]
    fn unresolved_cards_are_skipped_but_counted_in_total() {
        let cards = vec![card("a", 2, "Spell")];
        let deck = deck_with(&[("a", 3), ("ghost", 2)]);
        let report = analyze_deck(&deck, &resolve(&deck, &cards), &AnalysisConfig::default());

        assert_eq!(report.total_cards, 5);
        assert_eq!(report.mana_curve.values().sum::<u32>(), 3);
        assert_eq!(report.unresolved_cards, vec!["ghost".to_string()]);
    }

    #[test]
    fn size_recommendations_follow_config() {
        let cards = vec![card("a", 2, "Spell")];
        let small = deck_with(&[("a", 10)]);
        let report = analyze_deck(&small, &resolve(&small, &cards), &AnalysisConfig::default());
        assert_eq!(report.recommendations, vec!["Deck is below minimum size (30 cards)"]);

        let big = deck_with(&[("a", 61)]);
        let report = analyze_deck(&big, &resolve(&big, &cards), &AnalysisConfig::default());
        assert_eq!(report.recommendations, vec!["Deck is above recommended size (60 cards)"]);

        let config = AnalysisConfig {
            min_deck_size: 5,
            ..AnalysisConfig::default()
        };
        let report = analyze_deck(&small, &resolve(&small, &cards), &config);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn low_cost_rule_triggers_below_ratio() {
        let cards = vec![card("cheap", 2, "Spell"), card("pricey", 7, "Creature")];
        let deck = deck_with(&[("cheap", 8), ("pricey", 32)]);
        let report = analyze_deck(&deck, &resolve(&deck, &cards), &AnalysisConfig::default());
        assert_eq!(
            report.recommendations,
            vec!["Consider adding more low-cost cards for early game"]
        );

        let balanced = deck_with(&[("cheap", 13), ("pricey", 27)]);
        let report = analyze_deck(&balanced, &resolve(&balanced, &cards), &AnalysisConfig::default());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn oversized_quantities_do_not_overflow() {
        let cards = vec![card("a", 2, "Spell"), card("b", 2, "Spell")];
        let deck = deck_with(&[("a", 3_000_000_000), ("b", 3_000_000_000)]);
        let report = analyze_deck(&deck, &resolve(&deck, &cards), &AnalysisConfig::default());

        assert_eq!(report.total_cards, u32::MAX);
        assert_eq!(report.mana_curve.get(&2), Some(&u32::MAX));
        assert_eq!(report.card_types.get("Spell"), Some(&u32::MAX));
        assert_eq!(report.cards_costing(1, 3), u32::MAX);
    }

    #[test]
    fn empty_deck_only_gets_size_warning() {
        let deck = deck_with(&[]);
        let report = analyze_deck(&deck, &[], &AnalysisConfig::default());
        assert_eq!(report.total_cards, 0);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn mana_curve_optimizer_flags_both_bands() {
        let cards = vec![card("cheap", 1, "Spell"), card("pricey", 8, "Creature")];
        let deck = deck_with(&[("cheap", 2), ("pricey", 8)]);
        let config = AnalysisConfig::default();
        let report = analyze_deck(&deck, &resolve(&deck, &cards), &config);

        let kinds: Vec<String> = optimize(OptimizationKind::ManaCurve, &report, &config)
            .into_iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(kinds, vec!["reduce_high_cost", "add_early_game"]);
    }

    #[test]
    fn synergy_optimizer_is_generic() {
        let deck = deck_with(&[]);
        let config = AnalysisConfig::default();
        let report = analyze_deck(&deck, &[], &config);
        let suggestions = optimize(OptimizationKind::CardSynergy, &report, &config);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].priority, Priority::Medium);
    }

    #[test]
    fn optimization_kind_parsing() {
        assert_eq!(OptimizationKind::parse("mana_curve"), Some(OptimizationKind::ManaCurve));
        assert_eq!(OptimizationKind::parse("card_synergy"), Some(OptimizationKind::CardSynergy));
        assert_eq!(OptimizationKind::parse("vibes"), None);
    }

    #[test]
    fn suggestion_serializes_type_key() {
        let s = Suggestion {
            kind: "synergy".to_string(),
            message: "m".to_string(),
            priority: Priority::Medium,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"type\":\"synergy\""));
        assert!(json.contains("\"priority\":\"medium\""));
    }
}
