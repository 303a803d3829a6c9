//! Web server for the deckwizard JSON API
//!
//! Every endpoint mirrors a catalog, deck or game operation. Failures are
//! returned as `{"error": message}` with a non-2xx status.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::analysis::{AnalysisReport, Suggestion};
use crate::bracket::{self, Bracket, BracketType};
use crate::database::{count_rows, Table};
use crate::decks::DeckStore;
use crate::error::DeckWizardError;
use crate::formats::{export_deck, import_cards, DeckExport, ExportFormat, ImportFormat, ImportReport};
use crate::games::{DeckStatistics, GameLog, NewGame};
use crate::models::{card_id_from_name, Card, CardFilter, Deck, GameOutcome, GameResult};

/// Shared application state
#[derive(Clone)]
struct AppState {
    decks: DeckStore,
    games: GameLog,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Handler error: status plus message
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DeckWizardError> for ApiError {
    fn from(err: DeckWizardError) -> Self {
        let status = match &err {
            DeckWizardError::NotFound { .. } => StatusCode::NOT_FOUND,
            DeckWizardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DeckWizardError::ConstraintViolation(_) => StatusCode::CONFLICT,
            DeckWizardError::Storage(_) | DeckWizardError::Encoding(_) | DeckWizardError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", err);
        } else {
            log::warn!("Request rejected: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Cards ──────────────────────────────────────────────────────────────────

/// Card search query parameters; empty values are ignored
#[derive(Debug, Deserialize)]
struct CardQuery {
    name: Option<String>,
    #[serde(rename = "type")]
    card_type: Option<String>,
    rarity: Option<String>,
    cost: Option<String>,
}

impl CardQuery {
    fn into_filter(self) -> Result<CardFilter, ApiError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let cost = match non_empty(self.cost) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ApiError::bad_request(format!("invalid cost: {}", raw)))?,
            ),
            None => None,
        };
        Ok(CardFilter {
            name: non_empty(self.name),
            card_type: non_empty(self.card_type),
            rarity: non_empty(self.rarity),
            cost,
        })
    }
}

/// GET /api/cards?name&type&rarity&cost
async fn list_cards_handler(
    State(state): State<AppState>,
    query: Result<Query<CardQuery>, QueryRejection>,
) -> ApiResult<Vec<Card>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    Ok(Json(state.decks.catalog().search(&filter)?))
}

/// Card creation body; `id` defaults to one derived from the name
#[derive(Debug, Deserialize)]
struct NewCardBody {
    id: Option<String>,
    name: String,
    cost: i64,
    card_type: String,
    rarity: String,
    set_name: String,
    #[serde(default)]
    description: String,
    attack: Option<i64>,
    health: Option<i64>,
    #[serde(default)]
    abilities: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CardCreated {
    message: &'static str,
    card_id: String,
}

/// POST /api/cards
async fn create_card_handler(
    State(state): State<AppState>,
    body: Result<Json<NewCardBody>, JsonRejection>,
) -> ApiResult<CardCreated> {
    let Json(body) = body?;
    let card = Card {
        id: body.id.unwrap_or_else(|| card_id_from_name(&body.name)),
        name: body.name,
        cost: body.cost,
        card_type: body.card_type,
        rarity: body.rarity,
        set_name: body.set_name,
        description: body.description,
        attack: body.attack,
        health: body.health,
        abilities: body.abilities,
    };
    state.decks.catalog().upsert(&card)?;
    Ok(Json(CardCreated {
        message: "Card added successfully",
        card_id: card.id,
    }))
}

/// GET /api/cards/{id}
async fn get_card_handler(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> ApiResult<Card> {
    state
        .decks
        .catalog()
        .get(&card_id)?
        .map(Json)
        .ok_or_else(|| DeckWizardError::not_found("Card", card_id).into())
}

// ── Decks ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NewDeckBody {
    name: String,
    format: String,
}

#[derive(Debug, Serialize)]
struct DeckCreated {
    message: &'static str,
    deck_id: String,
    deck: Deck,
}

#[derive(Debug, Serialize)]
struct DeckUpdated {
    message: &'static str,
    deck: Deck,
}

/// GET /api/decks
async fn list_decks_handler(State(state): State<AppState>) -> ApiResult<Vec<Deck>> {
    Ok(Json(state.decks.list()?))
}

/// POST /api/decks
async fn create_deck_handler(
    State(state): State<AppState>,
    body: Result<Json<NewDeckBody>, JsonRejection>,
) -> ApiResult<DeckCreated> {
    let Json(body) = body?;
    let deck = state.decks.create(&body.name, &body.format)?;
    Ok(Json(DeckCreated {
        message: "Deck created successfully",
        deck_id: deck.id.clone(),
        deck,
    }))
}

/// GET /api/decks/{id}
async fn get_deck_handler(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
) -> ApiResult<Deck> {
    Ok(Json(state.decks.require(&deck_id)?))
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct AddCardBody {
    card_id: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

/// POST /api/decks/{id}/cards
async fn add_card_handler(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
    body: Result<Json<AddCardBody>, JsonRejection>,
) -> ApiResult<DeckUpdated> {
    let Json(body) = body?;
    let mut deck = state.decks.require(&deck_id)?;
    state.decks.add_card(&mut deck, &body.card_id, body.quantity)?;
    Ok(Json(DeckUpdated {
        message: "Card added to deck successfully",
        deck,
    }))
}

#[derive(Debug, Deserialize)]
struct QuantityParams {
    #[serde(default = "default_quantity")]
    quantity: u32,
}

/// DELETE /api/decks/{id}/cards/{card_id}?quantity={n}
async fn remove_card_handler(
    State(state): State<AppState>,
    Path((deck_id, card_id)): Path<(String, String)>,
    params: Result<Query<QuantityParams>, QueryRejection>,
) -> ApiResult<DeckUpdated> {
    let Query(params) = params?;
    let mut deck = state.decks.require(&deck_id)?;
    state.decks.remove_card(&mut deck, &card_id, params.quantity)?;
    Ok(Json(DeckUpdated {
        message: "Card removed from deck successfully",
        deck,
    }))
}

/// GET /api/decks/{id}/analyze
async fn analyze_handler(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
) -> ApiResult<AnalysisReport> {
    let deck = state.decks.require(&deck_id)?;
    Ok(Json(state.decks.analyze(&deck)?))
}

#[derive(Debug, Deserialize)]
struct SuggestParams {
    count: Option<usize>,
}

/// GET /api/decks/{id}/suggestions?count={n}
async fn suggestions_handler(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> ApiResult<Vec<Card>> {
    let Query(params) = params?;
    let count = params
        .count
        .unwrap_or(state.decks.config().default_suggestion_count);
    let deck = state.decks.require(&deck_id)?;
    Ok(Json(state.decks.suggest(&deck, count)?))
}

/// GET /api/decks/{id}/stats
async fn stats_handler(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
) -> ApiResult<DeckStatistics> {
    state
        .games
        .statistics(&deck_id)?
        .map(Json)
        .ok_or_else(|| DeckWizardError::not_found("Deck", deck_id).into())
}

// ── Games ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RecordGameBody {
    deck_id: String,
    opponent_deck: String,
    result: String,
    game_length: u32,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Serialize)]
struct GameRecorded {
    message: &'static str,
    game: GameResult,
}

/// POST /api/games
async fn record_game_handler(
    State(state): State<AppState>,
    body: Result<Json<RecordGameBody>, JsonRejection>,
) -> ApiResult<GameRecorded> {
    let Json(body) = body?;
    let result: GameOutcome = body.result.parse()?;
    let game = state.games.record(NewGame {
        deck_id: &body.deck_id,
        opponent_deck: &body.opponent_deck,
        result,
        game_length: body.game_length,
        notes: &body.notes,
    })?;
    Ok(Json(GameRecorded {
        message: "Game recorded successfully",
        game,
    }))
}

// ── Import / export / optimise ─────────────────────────────────────────────

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Deserialize)]
struct ImportBody {
    #[serde(default = "default_format")]
    format: String,
    #[serde(default)]
    cards: Vec<Value>,
}

/// POST /api/import/cards
async fn import_handler(
    State(state): State<AppState>,
    body: Result<Json<ImportBody>, JsonRejection>,
) -> ApiResult<ImportReport> {
    let Json(body) = body?;
    let format = ImportFormat::parse(&body.format);
    Ok(Json(import_cards(state.decks.catalog(), format, &body.cards)))
}

#[derive(Debug, Deserialize)]
struct ExportParams {
    #[serde(default = "default_format")]
    format: String,
}

/// GET /api/export/deck/{id}?format={json|mtg|arena}
async fn export_handler(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
    params: Result<Query<ExportParams>, QueryRejection>,
) -> ApiResult<DeckExport> {
    let Query(params) = params?;
    let deck = state.decks.require(&deck_id)?;
    let resolved = state.decks.resolve_cards(&deck)?;
    Ok(Json(export_deck(
        &deck,
        &resolved,
        ExportFormat::parse(&params.format),
    )))
}

fn default_optimization() -> String {
    "mana_curve".to_string()
}

#[derive(Debug, Deserialize)]
struct OptimizeBody {
    #[serde(default = "default_optimization", rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct OptimizeResponse {
    suggestions: Vec<Suggestion>,
    current_analysis: AnalysisReport,
}

/// POST /api/optimize/deck/{id}
async fn optimize_handler(
    State(state): State<AppState>,
    Path(deck_id): Path<String>,
    body: Result<Json<OptimizeBody>, JsonRejection>,
) -> ApiResult<OptimizeResponse> {
    let Json(body) = body?;
    let deck = state.decks.require(&deck_id)?;
    let (suggestions, current_analysis) = state.decks.optimize(&deck, &body.kind)?;
    Ok(Json(OptimizeResponse {
        suggestions,
        current_analysis,
    }))
}

fn default_bracket() -> String {
    "single_elimination".to_string()
}

#[derive(Debug, Deserialize)]
struct BracketBody {
    #[serde(default)]
    participants: Vec<String>,
    #[serde(default = "default_bracket", rename = "type")]
    kind: String,
}

/// POST /api/tournament/bracket
async fn bracket_handler(body: Result<Json<BracketBody>, JsonRejection>) -> ApiResult<Bracket> {
    let Json(body) = body?;
    Ok(Json(bracket::generate(
        BracketType::parse(&body.kind),
        &body.participants,
    )))
}

/// Build the web server router
pub fn create_router(decks: DeckStore, games: GameLog) -> Router {
    let state = AppState { decks, games };

    Router::new()
        .route("/api/cards", get(list_cards_handler).post(create_card_handler))
        .route("/api/cards/{id}", get(get_card_handler))
        .route("/api/decks", get(list_decks_handler).post(create_deck_handler))
        .route("/api/decks/{id}", get(get_deck_handler))
        .route("/api/decks/{id}/cards", post(add_card_handler))
        .route("/api/decks/{id}/cards/{card_id}", delete(remove_card_handler))
        .route("/api/decks/{id}/analyze", get(analyze_handler))
        .route("/api/decks/{id}/suggestions", get(suggestions_handler))
        .route("/api/decks/{id}/stats", get(stats_handler))
        .route("/api/games", post(record_game_handler))
        .route("/api/import/cards", post(import_handler))
        .route("/api/export/deck/{id}", get(export_handler))
        .route("/api/optimize/deck/{id}", post(optimize_handler))
        .route("/api/tournament/bracket", post(bracket_handler))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) and stops on Ctrl+C.
pub async fn serve(
    decks: DeckStore,
    games: GameLog,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    {
        let conn = decks.database().connect()?;
        log::info!(
            "Serving {} cards, {} decks, {} logged games",
            count_rows(&conn, Table::Cards)?,
            count_rows(&conn, Table::Decks)?,
            count_rows(&conn, Table::GameResults)?
        );
    }

    let app = create_router(decks, games);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Web API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Web API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
#[path = "web_tests.rs"]
mod tests;
