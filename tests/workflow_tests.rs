use deckwizard::demo::sample_cards;
use deckwizard::formats::{export_deck, import_cards, DeckExport, ExportFormat, ImportFormat};
use deckwizard::{
    AnalysisConfig, AppConfig, CardFilter, Database, DeckStore, GameLog, GameOutcome, NewGame,
};
use serde_json::json;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

// Test fixtures

fn open_stores(dir: &TempDir) -> (DeckStore, GameLog) {
    let db = Database::open(dir.path().join("deckwizard.db")).unwrap();
    (
        DeckStore::new(db.clone(), AnalysisConfig::default()),
        GameLog::new(db),
    )
}

fn seed_catalog(decks: &DeckStore) {
    for card in sample_cards() {
        decks.catalog().upsert(&card).unwrap();
    }
}

fn build_fire_deck(decks: &DeckStore) -> deckwizard::Deck {
    let mut deck = decks.create("Fire Deck", "Standard").unwrap();
    for (card_id, quantity) in [
        ("fire_bolt", 4),
        ("lightning_strike", 3),
        ("goblin_warrior", 4),
        ("dragon_lord", 1),
        ("healing_potion", 2),
    ] {
        decks.add_card(&mut deck, card_id, quantity).unwrap();
    }
    deck
}

// Deck building and analysis

#[test]
fn test_fire_deck_analysis() {
    let dir = TempDir::new().unwrap();
    let (decks, _games) = open_stores(&dir);
    seed_catalog(&decks);

    let deck = build_fire_deck(&decks);
    assert_eq!(deck.total_cards(), 14);

    let report = decks.analyze(&deck).unwrap();
    assert_eq!(report.total_cards, 14);
    assert_eq!(report.mana_curve.get(&1), Some(&8));
    assert_eq!(report.mana_curve.get(&2), Some(&5));
    assert_eq!(report.mana_curve.get(&8), Some(&1));
    assert_eq!(report.card_types.get("Spell"), Some(&9));
    assert_eq!(report.card_types.get("Creature"), Some(&5));
    assert!(report
        .recommendations
        .contains(&"Deck is below minimum size (30 cards)".to_string()));
}

#[test]
fn test_creature_search() {
    let dir = TempDir::new().unwrap();
    let (decks, _games) = open_stores(&dir);
    seed_catalog(&decks);

    let mut ids: Vec<String> = decks
        .catalog()
        .search(&CardFilter::by_type("Creature"))
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["dragon_lord", "goblin_warrior"]);
}

#[test]
fn test_remove_absent_card_leaves_deck_unchanged() {
    let dir = TempDir::new().unwrap();
    let (decks, _games) = open_stores(&dir);
    seed_catalog(&decks);
    let mut deck = build_fire_deck(&decks);
    let before = decks.require(&deck.id).unwrap();

    let err = decks.remove_card(&mut deck, "black_lotus", 1).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(deck.cards, before.cards);
    assert_eq!(decks.require(&deck.id).unwrap(), before);
}

// Game tracking

#[test]
fn test_five_game_statistics() {
    let dir = TempDir::new().unwrap();
    let (decks, games) = open_stores(&dir);
    seed_catalog(&decks);
    let deck = build_fire_deck(&decks);

    for (i, result) in ["win", "win", "loss", "win", "draw"].iter().enumerate() {
        games
            .record(NewGame {
                deck_id: &deck.id,
                opponent_deck: "Opponent",
                result: result.parse::<GameOutcome>().unwrap(),
                game_length: 6 + i as u32,
                notes: "",
            })
            .unwrap();
    }

    let stats = games.statistics(&deck.id).unwrap().unwrap();
    assert_eq!(stats.games_played, 5);
    assert_eq!((stats.wins, stats.losses, stats.draws), (3, 1, 1));
    assert!((stats.win_rate - 0.6).abs() < 1e-9);
    assert!((stats.average_game_length - 8.0).abs() < 1e-9);

    // Card edits after games must not reset the running statistics
    let mut deck = decks.require(&deck.id).unwrap();
    decks.add_card(&mut deck, "fire_bolt", 1).unwrap();
    let reloaded = decks.require(&deck.id).unwrap();
    assert_eq!(reloaded.games_played, 5);
    assert!((reloaded.win_rate - 0.6).abs() < 1e-9);
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let deck_id = {
        let (decks, games) = open_stores(&dir);
        seed_catalog(&decks);
        let deck = build_fire_deck(&decks);
        games
            .record(NewGame {
                deck_id: &deck.id,
                opponent_deck: "Control",
                result: GameOutcome::Loss,
                game_length: 12,
                notes: "flooded",
            })
            .unwrap();
        deck.id
    };

    let (decks, games) = open_stores(&dir);
    let deck = decks.require(&deck_id).unwrap();
    assert_eq!(deck.total_cards(), 14);
    assert_eq!(deck.games_played, 1);
    let recent = games.games_for_deck(&deck_id).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].notes, "flooded");
}

// Import and export

#[test]
fn test_hearthstone_import_then_arena_export() {
    let dir = TempDir::new().unwrap();
    let (decks, _games) = open_stores(&dir);

    let records = vec![
        json!({"cardId": "CS2_029", "name": "Fireball", "cost": 4, "type": "SPELL",
               "rarity": "FREE", "cardSet": "Basic", "text": "Deal 6 damage."}),
        json!({"cardId": "CS2_182", "name": "Chillwind Yeti", "cost": 4, "type": "MINION",
               "rarity": "COMMON", "cardSet": "Basic", "attack": 4, "health": 5}),
    ];
    let report = import_cards(decks.catalog(), ImportFormat::Hearthstone, &records);
    assert_eq!(report.imported_count, 2);
    assert!(report.errors.is_empty());

    let mut deck = decks.create("Mage", "Wild").unwrap();
    decks.add_card(&mut deck, "CS2_029", 2).unwrap();
    decks.add_card(&mut deck, "CS2_182", 2).unwrap();
    decks.add_card(&mut deck, "missing_card", 1).unwrap();

    let resolved = decks.resolve_cards(&deck).unwrap();
    assert_eq!(resolved.len(), 2);

    match export_deck(&deck, &resolved, ExportFormat::Arena) {
        DeckExport::Arena { deck: text } => {
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines.len(), 2);
            assert!(lines.contains(&"2 Fireball (Basic) CS2_029"));
        }
        other => panic!("expected arena export, got {:?}", other),
    }

    let report = decks.analyze(&deck).unwrap();
    assert_eq!(report.total_cards, 5);
    assert_eq!(report.unresolved_cards, vec!["missing_card".to_string()]);
}

// Configuration

#[test]
fn test_config_file_changes_recommendations() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"analysis": {{"min_deck_size": 10}}}}"#).unwrap();
    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.analysis.min_deck_size, 10);
    assert_eq!(config.analysis.max_deck_size, 60);

    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("deckwizard.db")).unwrap();
    let decks = DeckStore::new(db, config.analysis);
    seed_catalog(&decks);
    let deck = build_fire_deck(&decks);

    let report = decks.analyze(&deck).unwrap();
    assert!(!report
        .recommendations
        .iter()
        .any(|r| r.starts_with("Deck is below minimum size")));
}
