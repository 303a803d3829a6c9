//! Sample data seeding for the `demo` command

use rand::Rng;

use crate::analysis::AnalysisReport;
use crate::decks::DeckStore;
use crate::error::Result;
use crate::games::{DeckStatistics, GameLog, NewGame};
use crate::models::{Card, Deck, GameOutcome};

/// What the demo created
#[derive(Debug)]
pub struct DemoSummary {
    pub deck: Deck,
    pub analysis: AnalysisReport,
    pub statistics: Option<DeckStatistics>,
}

pub fn sample_cards() -> Vec<Card> {
    vec![
        Card::new("fire_bolt", "Fire Bolt", 1, "Spell", "Common", "Core Set", "Deal 3 damage"),
        Card::new("lightning_strike", "Lightning Strike", 2, "Spell", "Common", "Core Set", "Deal 4 damage"),
        Card::new("goblin_warrior", "Goblin Warrior", 1, "Creature", "Common", "Core Set", "A fierce warrior")
            .with_stats(2, 1),
        Card::new("dragon_lord", "Dragon Lord", 8, "Creature", "Legendary", "Core Set", "Flying, powerful")
            .with_stats(8, 8),
        Card::new("healing_potion", "Healing Potion", 2, "Spell", "Common", "Core Set", "Restore 5 health"),
    ]
}

const DEMO_DECK: [(&str, u32); 5] = [
    ("fire_bolt", 4),
    ("lightning_strike", 3),
    ("goblin_warrior", 4),
    ("dragon_lord", 1),
    ("healing_potion", 2),
];

const DEMO_RESULTS: [GameOutcome; 5] = [
    GameOutcome::Win,
    GameOutcome::Win,
    GameOutcome::Loss,
    GameOutcome::Win,
    GameOutcome::Draw,
];

/// Seed sample cards, build "Fire Deck" and record five games against it
pub fn run_demo(decks: &DeckStore, games: &GameLog) -> Result<DemoSummary> {
    for card in sample_cards() {
        decks.catalog().upsert(&card)?;
    }
    log::info!("Added sample cards");

    let mut deck = decks.create("Fire Deck", "Standard")?;
    for (card_id, quantity) in DEMO_DECK {
        decks.add_card(&mut deck, card_id, quantity)?;
    }
    log::info!("Created sample deck: {}", deck.name);

    let mut rng = rand::thread_rng();
    for (i, result) in DEMO_RESULTS.into_iter().enumerate() {
        let opponent = format!("Opponent Deck {}", i + 1);
        let notes = format!("Game {} notes", i + 1);
        games.record(NewGame {
            deck_id: &deck.id,
            opponent_deck: &opponent,
            result,
            game_length: rng.gen_range(5..=15),
            notes: &notes,
        })?;
    }
    log::info!("Recorded sample games");

    let analysis = decks.analyze(&deck)?;
    let statistics = games.statistics(&deck.id)?;
    let deck = decks.require(&deck.id)?;

    Ok(DemoSummary {
        deck,
        analysis,
        statistics,
    })
}
