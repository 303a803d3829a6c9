//! Deckwizard - card collection, deck building and game tracking
//!
//! Command-line front end over the catalog, deck store and game log, plus
//! `serve` for the JSON API.

use clap::{Args as ClapArgs, Parser, Subcommand};
use deckwizard::formats::{export_deck, import_cards, ExportFormat, ImportFormat};
use deckwizard::{
    bracket::{self, BracketType},
    config::default_db_path,
    demo,
    models::card_id_from_name,
    web, AppConfig, Card, CardFilter, Database, DeckStore, DeckWizardError, GameLog, GameOutcome,
    NewGame,
};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Card collection and deck manager with game tracking
#[derive(Parser, Debug)]
#[command(name = "deckwizard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, global = true, default_value_os_t = default_db_path())]
    database: PathBuf,

    /// JSON config file with analysis thresholds
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the card catalog
    #[command(subcommand)]
    Card(CardCommand),
    /// Build and inspect decks
    #[command(subcommand)]
    Deck(DeckCommand),
    /// Record games and show deck statistics
    #[command(subcommand)]
    Game(GameCommand),
    /// Generate a tournament bracket
    Bracket {
        /// single_elimination, double_elimination or round_robin
        #[arg(long = "type", default_value = "single_elimination")]
        kind: String,
        participants: Vec<String>,
    },
    /// Seed sample cards, a deck and a few games
    Demo,
    /// Serve the JSON API
    Serve {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(ClapArgs, Debug)]
struct NewCardArgs {
    name: String,
    #[arg(long)]
    cost: i64,
    #[arg(long = "type")]
    card_type: String,
    #[arg(long, default_value = "Common")]
    rarity: String,
    #[arg(long = "set", default_value = "Core Set")]
    set_name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    attack: Option<i64>,
    #[arg(long)]
    health: Option<i64>,
    /// Repeat for several abilities
    #[arg(long = "ability")]
    abilities: Vec<String>,
    /// Card id; derived from the name when omitted
    #[arg(long)]
    id: Option<String>,
}

#[derive(Subcommand, Debug)]
enum CardCommand {
    /// Add or replace a card
    Add(NewCardArgs),
    /// Show a card by id
    Get { id: String },
    /// Search by exact attributes and partial name
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        card_type: Option<String>,
        #[arg(long)]
        rarity: Option<String>,
        #[arg(long)]
        cost: Option<i64>,
    },
    /// Import cards from a JSON file (array of records)
    Import {
        file: PathBuf,
        /// json, mtg or hearthstone
        #[arg(long, default_value = "json")]
        format: String,
    },
}

#[derive(Subcommand, Debug)]
enum DeckCommand {
    /// Create an empty deck
    Create {
        name: String,
        #[arg(long, default_value = "Standard")]
        format: String,
    },
    /// List decks, newest first
    List,
    /// Show a deck
    Show { deck_id: String },
    /// Add copies of a card
    AddCard {
        deck_id: String,
        card_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove copies of a card
    RemoveCard {
        deck_id: String,
        card_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Mana curve, type and rarity breakdown with recommendations
    Analyze { deck_id: String },
    /// Suggest catalog cards sharing the deck's card types
    Suggest {
        deck_id: String,
        #[arg(long)]
        count: Option<usize>,
    },
    /// Optimization suggestions (mana_curve or card_synergy)
    Optimize {
        deck_id: String,
        #[arg(long = "type", default_value = "mana_curve")]
        kind: String,
    },
    /// Export a deck (json, mtg or arena)
    Export {
        deck_id: String,
        #[arg(long, default_value = "json")]
        format: String,
    },
}

#[derive(Subcommand, Debug)]
enum GameCommand {
    /// Record a game result for a deck
    Record {
        deck_id: String,
        #[arg(long)]
        opponent: String,
        /// win, loss or draw
        #[arg(long)]
        result: String,
        /// Game length in turns
        #[arg(long)]
        length: u32,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Show statistics for a deck
    Stats { deck_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_file.as_deref()) {
        eprintln!("Failed to open log file: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<DeckWizardError>() {
                Some(DeckWizardError::NotFound { .. } | DeckWizardError::InvalidInput(_)) => {
                    log::warn!("{}", e)
                }
                _ => log::error!("{}", e),
            }
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load_or_default(args.config.as_deref())?;
    let db = Database::open(&args.database)?;
    log::debug!("Database path: {}", db.path().display());

    let decks = DeckStore::new(db.clone(), config.analysis);
    let games = GameLog::new(db);

    match args.command {
        Command::Card(cmd) => run_card(&decks, cmd)?,
        Command::Deck(cmd) => run_deck(&decks, cmd)?,
        Command::Game(cmd) => run_game(&games, cmd)?,
        Command::Bracket { kind, participants } => {
            print_json(&bracket::generate(BracketType::parse(&kind), &participants))?;
        }
        Command::Demo => run_demo(&decks, &games)?,
        Command::Serve { port } => web::serve(decks, games, port).await?,
    }
    Ok(())
}

fn run_card(decks: &DeckStore, cmd: CardCommand) -> Result<(), Box<dyn Error>> {
    let catalog = decks.catalog();
    match cmd {
        CardCommand::Add(new) => {
            let card = Card {
                id: new.id.unwrap_or_else(|| card_id_from_name(&new.name)),
                name: new.name,
                cost: new.cost,
                card_type: new.card_type,
                rarity: new.rarity,
                set_name: new.set_name,
                description: new.description,
                attack: new.attack,
                health: new.health,
                abilities: new.abilities,
            };
            catalog.upsert(&card)?;
            println!("Added card {} ({})", card.name, card.id);
        }
        CardCommand::Get { id } => match catalog.get(&id)? {
            Some(card) => print_json(&card)?,
            None => return Err(DeckWizardError::not_found("Card", id).into()),
        },
        CardCommand::Search {
            name,
            card_type,
            rarity,
            cost,
        } => {
            let filter = CardFilter {
                name,
                card_type,
                rarity,
                cost,
            };
            let cards = catalog.search(&filter)?;
            for card in &cards {
                println!("{:<24} {:<24} cost {:>2}  {}", card.id, card.name, card.cost, card.card_type);
            }
            println!("{} card(s) found", cards.len());
        }
        CardCommand::Import { file, format } => {
            let contents = std::fs::read_to_string(&file)?;
            let records = match serde_json::from_str::<Value>(&contents)? {
                Value::Array(records) => records,
                Value::Object(mut obj) => match obj.remove("cards") {
                    Some(Value::Array(records)) => records,
                    _ => vec![Value::Object(obj)],
                },
                other => vec![other],
            };
            let report = import_cards(catalog, ImportFormat::parse(&format), &records);
            for error in &report.errors {
                eprintln!("{}", error);
            }
            println!(
                "Imported {} card(s) from {}",
                report.imported_count,
                file.display()
            );
        }
    }
    Ok(())
}

fn run_deck(decks: &DeckStore, cmd: DeckCommand) -> Result<(), Box<dyn Error>> {
    match cmd {
        DeckCommand::Create { name, format } => {
            let deck = decks.create(&name, &format)?;
            println!("Created deck {} ({})", deck.name, deck.id);
        }
        DeckCommand::List => {
            let all = decks.list()?;
            for deck in &all {
                println!(
                    "{}  {:<24} {:<12} {:>3} cards  {:>3} games  {:.1}% wins",
                    deck.id,
                    deck.name,
                    deck.format,
                    deck.total_cards(),
                    deck.games_played,
                    deck.win_rate * 100.0
                );
            }
            println!("{} deck(s)", all.len());
        }
        DeckCommand::Show { deck_id } => print_json(&decks.require(&deck_id)?)?,
        DeckCommand::AddCard {
            deck_id,
            card_id,
            quantity,
        } => {
            let mut deck = decks.require(&deck_id)?;
            decks.add_card(&mut deck, &card_id, quantity)?;
            println!(
                "Added {} x {} to {} ({} now)",
                quantity,
                card_id,
                deck.name,
                deck.quantity_of(&card_id)
            );
        }
        DeckCommand::RemoveCard {
            deck_id,
            card_id,
            quantity,
        } => {
            let mut deck = decks.require(&deck_id)?;
            decks.remove_card(&mut deck, &card_id, quantity)?;
            println!(
                "Removed {} x {} from {} ({} left)",
                quantity,
                card_id,
                deck.name,
                deck.quantity_of(&card_id)
            );
        }
        DeckCommand::Analyze { deck_id } => {
            let deck = decks.require(&deck_id)?;
            print_json(&decks.analyze(&deck)?)?;
        }
        DeckCommand::Suggest { deck_id, count } => {
            let deck = decks.require(&deck_id)?;
            let count = count.unwrap_or(decks.config().default_suggestion_count);
            for card in decks.suggest(&deck, count)? {
                println!("{:<24} {:<24} cost {:>2}  {}", card.id, card.name, card.cost, card.card_type);
            }
        }
        DeckCommand::Optimize { deck_id, kind } => {
            let deck = decks.require(&deck_id)?;
            let (suggestions, _) = decks.optimize(&deck, &kind)?;
            if suggestions.is_empty() {
                println!("No suggestions for {}", deck.name);
            }
            print_json(&suggestions)?;
        }
        DeckCommand::Export { deck_id, format } => {
            let deck = decks.require(&deck_id)?;
            let resolved = decks.resolve_cards(&deck)?;
            print_json(&export_deck(&deck, &resolved, ExportFormat::parse(&format)))?;
        }
    }
    Ok(())
}

fn run_game(games: &GameLog, cmd: GameCommand) -> Result<(), Box<dyn Error>> {
    match cmd {
        GameCommand::Record {
            deck_id,
            opponent,
            result,
            length,
            notes,
        } => {
            let outcome: GameOutcome = result.parse()?;
            let game = games.record(NewGame {
                deck_id: &deck_id,
                opponent_deck: &opponent,
                result: outcome,
                game_length: length,
                notes: &notes,
            })?;
            println!("Recorded {} against {} ({})", game.result, game.opponent_deck, game.id);
        }
        GameCommand::Stats { deck_id } => match games.statistics(&deck_id)? {
            Some(stats) => print_json(&stats)?,
            None => return Err(DeckWizardError::not_found("Deck", deck_id).into()),
        },
    }
    Ok(())
}

fn run_demo(decks: &DeckStore, games: &GameLog) -> Result<(), Box<dyn Error>> {
    let summary = demo::run_demo(decks, games)?;

    println!("Created deck: {} ({})", summary.deck.name, summary.deck.id);
    println!("Total cards: {}", summary.analysis.total_cards);
    println!("Mana curve:");
    for (cost, count) in &summary.analysis.mana_curve {
        println!("  {:>2}: {}", cost, count);
    }
    for recommendation in &summary.analysis.recommendations {
        println!("Recommendation: {}", recommendation);
    }
    if let Some(stats) = &summary.statistics {
        println!(
            "Games: {} (W {} / L {} / D {}), win rate {:.1}%, average length {:.1} turns",
            stats.games_played,
            stats.wins,
            stats.losses,
            stats.draws,
            stats.win_rate * 100.0,
            stats.average_game_length
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
