//! HTTP API for the game.
//!
//! Routing rules: the language segment must be a two-letter code of an
//! enabled language, and daily mode needs a generated sequence for that
//! language. Everything else about a game lives server-side in memory.

use crate::compare::GuessFeedback;
use crate::config::Config;
use crate::daily::DailySchedule;
use crate::game::{Game, GameError, GameMode, GameStatus, GuessRecord};
use crate::i18n::{Language, Translator};
use crate::link::RefTemplate;
use crate::pokedex::{self, IndexedEntry, Pokedex};
use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type SharedState = Arc<AppState>;

/// Games untouched for this long are dropped when a new game is created.
const SESSION_TTL_HOURS: i64 = 48;

/// Games held at once; past this the least recently touched are dropped.
const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Session {
    game: Game,
    touched: DateTime<Utc>,
}

/// Drop expired sessions, then the oldest ones until one more fits under
/// `max_sessions`. Returns how many were dropped.
fn prune_sessions(
    sessions: &mut HashMap<Uuid, Session>,
    now: DateTime<Utc>,
    max_sessions: usize,
) -> usize {
    let before = sessions.len();
    let ttl = TimeDelta::hours(SESSION_TTL_HOURS);
    sessions.retain(|_, session| now - session.touched < ttl);

    let max_sessions = max_sessions.max(1);
    if sessions.len() >= max_sessions {
        let mut by_age: Vec<(DateTime<Utc>, Uuid)> = sessions
            .iter()
            .map(|(id, session)| (session.touched, *id))
            .collect();
        by_age.sort();
        let excess = sessions.len() + 1 - max_sessions;
        for (_, id) in by_age.into_iter().take(excess) {
            sessions.remove(&id);
        }
    }

    before - sessions.len()
}

/// Date of the daily puzzle a request asks for. Future puzzles are not served.
fn puzzle_date(requested: Option<NaiveDate>) -> Result<NaiveDate, GameError> {
    let today = Utc::now().date_naive();
    match requested {
        Some(date) if date > today => Err(GameError::NoPuzzle(date)),
        Some(date) => Ok(date),
        None => Ok(today),
    }
}

/// Per-language resources loaded at startup.
pub struct LanguageAssets {
    pub translator: Translator,
    pub refs: Option<RefTemplate>,
    pub daily: Option<DailySchedule>,
}

impl LanguageAssets {
    fn load(config: &Config, language: Language) -> Result<Self> {
        let code = language.code();
        Ok(Self {
            translator: Translator::load(&config.translation_dir, language)?,
            refs: RefTemplate::load(&config.translation_dir, code)?,
            daily: DailySchedule::load(&config.generated_dir, code)?,
        })
    }
}

pub struct AppState {
    pub config: Config,
    pub pokedex: Pokedex,
    assets: HashMap<&'static str, LanguageAssets>,
    games: RwLock<HashMap<Uuid, Session>>,
    max_sessions: usize,
}

impl AppState {
    /// Load the dataset and every language's translation, ref template and
    /// daily sequence.
    pub fn load(config: Config) -> Result<Self> {
        let pokedex = Pokedex::load(&config.pokedex_file)
            .with_context(|| format!("Failed to load {}", config.pokedex_file.display()))?;
        Self::new(config, pokedex)
    }

    /// State around an already loaded dataset.
    pub fn new(config: Config, pokedex: Pokedex) -> Result<Self> {
        info!(
            "Loaded {} Pokémon (generations 1-{})",
            pokedex.len(),
            pokedex.max_generation()
        );

        let mut assets = HashMap::new();
        for language in Language::all() {
            let loaded = LanguageAssets::load(&config, language)?;
            match &loaded.daily {
                Some(daily) => info!(
                    "[{}] daily puzzles {} to {}",
                    language.code(),
                    daily.starting_date,
                    daily.computed_end_date()
                ),
                None => warn!("[{}] no daily sequence, daily mode disabled", language.code()),
            }
            assets.insert(language.code(), loaded);
        }

        Ok(Self {
            config,
            pokedex,
            assets,
            games: RwLock::new(HashMap::new()),
            max_sessions: DEFAULT_MAX_SESSIONS,
        })
    }

    fn resolve(&self, code: &str) -> Result<(Language, &LanguageAssets), ApiError> {
        let not_found = || ApiError::NotFound {
            lang: Some(code.to_string()),
            daily: false,
        };
        if code.chars().count() != 2 {
            return Err(ApiError::NotFound {
                lang: None,
                daily: false,
            });
        }
        let language = Language::from_code(code).map_err(|_| not_found())?;
        let assets = self.assets.get(language.code()).ok_or_else(not_found)?;
        Ok((language, assets))
    }

    fn max_generation(&self) -> u8 {
        self.config
            .max_generation
            .unwrap_or_else(|| self.pokedex.max_generation())
    }
}

// ==================== Errors ====================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound { lang: Option<String>, daily: bool },

    #[error("unknown game {0}")]
    UnknownGame(Uuid),

    #[error("{message}")]
    Game {
        #[source]
        source: GameError,
        message: String,
    },
}

impl ApiError {
    /// Wrap a game error with a message in the player's language.
    fn game(source: GameError, translator: &Translator) -> Self {
        let message = match &source {
            GameError::UnknownPokemon(name) => {
                translator.t_with("Unknown Pokémon", &[("name", name)])
            }
            GameError::AlreadyGuessed(name) => {
                translator.t_with("Already guessed", &[("name", name)])
            }
            GameError::NoPuzzle(_) => translator.t("No daily puzzle"),
            other => other.to_string(),
        };
        ApiError::Game { source, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound { lang, daily } => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string(), "lang": lang, "daily": daily }),
            ),
            ApiError::UnknownGame(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::Game { source, message } => {
                let status = match source {
                    GameError::UnknownPokemon(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    GameError::AlreadyGuessed(_) | GameError::Finished => StatusCode::CONFLICT,
                    GameError::InvalidGenerationRange { .. } | GameError::NoCandidates { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    GameError::NoPuzzle(_) => StatusCode::NOT_FOUND,
                    GameError::UnknownSecret(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let daily = matches!(source, GameError::NoPuzzle(_));
                (status, json!({ "error": message, "daily": daily }))
            }
        };

        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(body)).into_response()
    }
}

// ==================== Views ====================

#[derive(Debug, Serialize)]
pub struct EntryView {
    pub key: String,
    pub name: String,
    pub base: Option<String>,
    pub generation: u8,
    pub types: Vec<String>,
    pub info: String,
    pub link: Option<String>,
}

impl EntryView {
    fn new(indexed: &IndexedEntry, language: Language, assets: &LanguageAssets) -> Self {
        let entry = &indexed.entry;
        Self {
            key: entry.key().to_string(),
            name: entry.name.localized(language.code()).to_string(),
            base: indexed
                .base
                .as_ref()
                .map(|b| b.localized(language.code()).to_string()),
            generation: entry.generation,
            types: entry
                .types
                .iter()
                .map(|t| assets.translator.type_name(*t))
                .collect(),
            info: pokedex::info(entry, &assets.translator),
            link: assets.refs.as_ref().and_then(|r| r.link_for(entry)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GuessView {
    pub guess: EntryView,
    pub feedback: GuessFeedback,
    pub emoji: String,
}

#[derive(Debug, Serialize)]
pub struct GameView {
    pub id: Uuid,
    pub lang: &'static str,
    #[serde(flatten)]
    pub mode: GameMode,
    pub status: GameStatus,
    pub max_attempts: usize,
    pub attempts_left: usize,
    pub guesses: Vec<GuessView>,
    /// Revealed once the game is over
    pub answer: Option<EntryView>,
    pub share: Option<String>,
    pub message: Option<String>,
}

fn guess_view(
    state: &AppState,
    record: &GuessRecord,
    language: Language,
    assets: &LanguageAssets,
) -> Option<GuessView> {
    let indexed = state.pokedex.get(&record.key)?;
    Some(GuessView {
        guess: EntryView::new(indexed, language, assets),
        feedback: record.feedback,
        emoji: record.feedback.emoji_row(),
    })
}

fn game_view(
    state: &AppState,
    id: Uuid,
    game: &Game,
    language: Language,
    assets: &LanguageAssets,
) -> GameView {
    let translator = &assets.translator;
    let status = game.status();
    let finished = status != GameStatus::InProgress;

    let answer = finished
        .then(|| state.pokedex.get(game.secret()))
        .flatten()
        .map(|e| EntryView::new(e, language, assets));

    let mode_label = match game.mode() {
        GameMode::Daily { .. } => translator.t("Daily"),
        GameMode::Free { .. } => translator.t("Free"),
    };

    let message = match status {
        GameStatus::Won => Some(translator.t("You won!")),
        GameStatus::Lost => answer
            .as_ref()
            .map(|a| translator.t_with("Game over", &[("answer", &a.name)])),
        GameStatus::InProgress => None,
    };

    GameView {
        id,
        lang: language.code(),
        mode: game.mode(),
        status,
        max_attempts: game.max_attempts(),
        attempts_left: game.attempts_left(),
        guesses: game
            .guesses()
            .iter()
            .filter_map(|g| guess_view(state, g, language, assets))
            .collect(),
        answer,
        share: finished.then(|| game.share_text("Squirdle", &mode_label)),
        message,
    }
}

// ==================== Handlers ====================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
struct LanguageView {
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    daily: bool,
}

async fn languages(State(state): State<SharedState>) -> Json<Vec<LanguageView>> {
    Json(
        Language::all()
            .into_iter()
            .map(|language| LanguageView {
                code: language.code(),
                name: language.name(),
                native_name: language.native_name(),
                daily: state
                    .assets
                    .get(language.code())
                    .is_some_and(|a| a.daily.is_some()),
            })
            .collect(),
    )
}

async fn translation(
    State(state): State<SharedState>,
    Path(lang): Path<String>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let (_, assets) = state.resolve(&lang)?;
    Ok(Json(assets.translator.table()))
}

async fn pokedex_list(
    State(state): State<SharedState>,
    Path(lang): Path<String>,
) -> Result<Json<Vec<EntryView>>, ApiError> {
    let (language, assets) = state.resolve(&lang)?;
    Ok(Json(
        state
            .pokedex
            .iter()
            .map(|e| EntryView::new(e, language, assets))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct DailyInfo {
    number: usize,
    date: NaiveDate,
    starting_date: NaiveDate,
    end_date: NaiveDate,
    max_attempts: usize,
}

fn daily_schedule<'a>(assets: &'a LanguageAssets, lang: &str) -> Result<&'a DailySchedule, ApiError> {
    assets.daily.as_ref().ok_or_else(|| ApiError::NotFound {
        lang: Some(lang.to_string()),
        daily: true,
    })
}

async fn daily_info(
    State(state): State<SharedState>,
    Path(lang): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyInfo>, ApiError> {
    let (language, assets) = state.resolve(&lang)?;
    let schedule = daily_schedule(assets, language.code())?;
    let date = puzzle_date(query.date).map_err(|e| ApiError::game(e, &assets.translator))?;

    let puzzle = schedule
        .answer_for(date)
        .ok_or_else(|| ApiError::game(GameError::NoPuzzle(date), &assets.translator))?;

    Ok(Json(DailyInfo {
        number: puzzle.number,
        date,
        starting_date: schedule.starting_date,
        end_date: schedule.computed_end_date(),
        max_attempts: state.config.max_attempts,
    }))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeRequest {
    Daily,
    Free,
}

#[derive(Debug, Deserialize)]
struct NewGameRequest {
    mode: ModeRequest,
    min_gen: Option<u8>,
    max_gen: Option<u8>,
    date: Option<NaiveDate>,
}

async fn create_game(
    State(state): State<SharedState>,
    Path(lang): Path<String>,
    Json(req): Json<NewGameRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let (language, assets) = state.resolve(&lang)?;
    let max_attempts = state.config.max_attempts;

    let game = match req.mode {
        ModeRequest::Daily => {
            let schedule = daily_schedule(assets, language.code())?;
            puzzle_date(req.date)
                .and_then(|date| Game::daily(&state.pokedex, schedule, date, max_attempts))
        }
        ModeRequest::Free => {
            let min_gen = req.min_gen.unwrap_or(state.config.min_generation);
            let max_gen = req.max_gen.unwrap_or_else(|| state.max_generation());
            let mut rng = rand::thread_rng();
            Game::free(&state.pokedex, min_gen, max_gen, max_attempts, &mut rng)
        }
    }
    .map_err(|e| ApiError::game(e, &assets.translator))?;

    let id = Uuid::new_v4();
    let view = game_view(&state, id, &game, language, assets);

    let now = Utc::now();
    let mut games = state.games.write().await;
    let dropped = prune_sessions(&mut games, now, state.max_sessions);
    if dropped > 0 {
        debug!("Dropped {} stale games", dropped);
    }
    games.insert(id, Session { game, touched: now });
    drop(games);
    info!("[{}] new {:?} game {}", language.code(), req.mode, id);

    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_game(
    State(state): State<SharedState>,
    Path((lang, id)): Path<(String, Uuid)>,
) -> Result<Json<GameView>, ApiError> {
    let (language, assets) = state.resolve(&lang)?;
    let games = state.games.read().await;
    let session = games.get(&id).ok_or(ApiError::UnknownGame(id))?;
    Ok(Json(game_view(&state, id, &session.game, language, assets)))
}

#[derive(Debug, Deserialize)]
struct GuessRequest {
    guess: String,
}

async fn make_guess(
    State(state): State<SharedState>,
    Path((lang, id)): Path<(String, Uuid)>,
    Json(req): Json<GuessRequest>,
) -> Result<Json<GameView>, ApiError> {
    let (language, assets) = state.resolve(&lang)?;
    let mut games = state.games.write().await;
    let session = games.get_mut(&id).ok_or(ApiError::UnknownGame(id))?;
    session.touched = Utc::now();

    session
        .game
        .guess(&state.pokedex, language, &req.guess)
        .map_err(|e| ApiError::game(e, &assets.translator))?;

    Ok(Json(game_view(&state, id, &session.game, language, assets)))
}

async fn not_found() -> ApiError {
    ApiError::NotFound {
        lang: None,
        daily: false,
    }
}

// ==================== Server ====================

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(languages))
        .route("/api/:lang/translation", get(translation))
        .route("/api/:lang/pokedex", get(pokedex_list))
        .route("/api/:lang/daily", get(daily_info))
        .route("/api/:lang/games", post(create_game))
        .route("/api/:lang/games/:id", get(get_game))
        .route("/api/:lang/games/:id/guesses", post(make_guess))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

/// Bind `config.port` and serve until Ctrl-C.
pub async fn serve(state: SharedState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokedex::{Height, LocalizedName, PokeType, PokedexEntry, Weight};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn mon(en: &str, ja: &str, generation: u8, types: Vec<PokeType>, m: f64) -> PokedexEntry {
        PokedexEntry {
            name: LocalizedName {
                en: en.to_string(),
                ja: ja.to_string(),
                ko: String::new(),
            },
            generation,
            types,
            height: Height { m },
            weight: Weight { kg: m * 10.0 },
            forms: Vec::new(),
        }
    }

    fn test_state(dir: &std::path::Path, with_daily: bool) -> SharedState {
        Arc::new(test_app(dir, with_daily))
    }

    fn test_app(dir: &std::path::Path, with_daily: bool) -> AppState {
        let config = Config {
            language: "en".to_string(),
            starting_date: None,
            pokedex_file: dir.join("pokedex.yaml"),
            pokedex_csv: dir.join("pokedex.csv"),
            translation_dir: dir.join("translation"),
            generated_dir: dir.join("generated"),
            port: 0,
            min_generation: 1,
            max_generation: None,
            max_attempts: 3,
            ref_check_concurrency: 1,
            fake_daily_url: String::new(),
        };
        if with_daily {
            DailySchedule::new(
                NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
                vec!["Eevee".to_string(), "Mudkip".to_string()],
            )
            .save(&config.generated_dir, "en")
            .unwrap();
        }

        let pokedex = Pokedex::from_entries(vec![
            mon("Pikachu", "ピカチュウ", 1, vec![PokeType::Electric], 0.4),
            mon("Eevee", "イーブイ", 1, vec![PokeType::Normal], 0.3),
            mon("Mudkip", "ミズゴロウ", 3, vec![PokeType::Water], 0.4),
        ])
        .unwrap();
        AppState::new(config, pokedex).unwrap()
    }

    async fn send(state: &SharedState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(json) => request.body(Body::from(json.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    // ==================== Routing ====================

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), false);
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_language_segment_must_be_two_letters() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), false);

        let (status, body) = send(&state, "GET", "/api/eng/pokedex", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["lang"], Value::Null);

        let (status, body) = send(&state, "GET", "/api/fr/pokedex", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["lang"], "fr");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), false);
        let (status, _) = send(&state, "GET", "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_languages_report_daily_availability() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), true);
        let (status, body) = send(&state, "GET", "/api/languages", None).await;

        assert_eq!(status, StatusCode::OK);
        let langs = body.as_array().unwrap();
        assert_eq!(langs.len(), 3);
        assert_eq!(langs[0]["code"], "en");
        assert_eq!(langs[0]["daily"], true);
        assert_eq!(langs[1]["native_name"], "日本語");
        assert_eq!(langs[1]["daily"], false);
    }

    // ==================== Content ====================

    #[tokio::test]
    async fn test_pokedex_is_localized() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), false);
        let (status, body) = send(&state, "GET", "/api/ja/pokedex", None).await;

        assert_eq!(status, StatusCode::OK);
        let eevee = body
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["key"] == "Eevee")
            .unwrap();
        assert_eq!(eevee["name"], "イーブイ");
        assert_eq!(eevee["types"][0], "ノーマル");
        assert_eq!(eevee["link"], Value::Null);
    }

    #[tokio::test]
    async fn test_translation_table_falls_back_to_english() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("translation")).unwrap();
        std::fs::write(
            dir.path().join("translation/en.json"),
            r#"{"Only in English": "hello"}"#,
        )
        .unwrap();
        let state = test_state(dir.path(), false);

        let (status, body) = send(&state, "GET", "/api/ko/translation", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Only in English"], "hello");
        assert_eq!(body["Gen"], "세대");
    }

    // ==================== Daily ====================

    #[tokio::test]
    async fn test_daily_without_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), false);

        let (status, body) = send(&state, "GET", "/api/en/daily", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["daily"], true);

        let (status, _) = send(&state, "POST", "/api/en/games", Some(serde_json::json!({"mode": "daily"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_daily_info_hides_answer() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), true);

        let (status, body) = send(&state, "GET", "/api/en/daily?date=2022-03-02", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["number"], 2);
        assert_eq!(body["end_date"], "2022-03-03");
        assert!(!body.to_string().contains("Mudkip"));

        let (status, body) = send(&state, "GET", "/api/en/daily?date=2022-03-03", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["daily"], true);
    }

    // ==================== Games ====================

    #[tokio::test]
    async fn test_daily_game_flow() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), true);

        let (status, game) = send(
            &state,
            "POST",
            "/api/en/games",
            Some(serde_json::json!({"mode": "daily", "date": "2022-03-02"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(game["mode"], "daily");
        assert_eq!(game["number"], 2);
        assert_eq!(game["answer"], Value::Null);
        let id = game["id"].as_str().unwrap().to_string();
        let guesses = format!("/api/en/games/{}/guesses", id);

        let (status, body) = send(&state, "POST", &guesses, Some(serde_json::json!({"guess": "Agumon"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Agumon"));

        let (status, body) = send(&state, "POST", &guesses, Some(serde_json::json!({"guess": "pikachu"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "in_progress");
        assert_eq!(body["guesses"][0]["emoji"], "🔼🟥🟩🟩🟩");
        assert_eq!(body["share"], Value::Null);

        let (status, _) = send(&state, "POST", &guesses, Some(serde_json::json!({"guess": "Pikachu"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&state, "POST", &guesses, Some(serde_json::json!({"guess": "Mudkip"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "won");
        assert_eq!(body["answer"]["key"], "Mudkip");
        assert_eq!(body["message"], "You got it!");
        assert!(body["share"].as_str().unwrap().starts_with("Squirdle Daily #2 2/3"));

        let (status, _) = send(&state, "POST", &guesses, Some(serde_json::json!({"guess": "Eevee"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&state, "GET", &format!("/api/en/games/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["guesses"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_free_game_generation_range() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), false);

        let (status, game) = send(
            &state,
            "POST",
            "/api/ja/games",
            Some(serde_json::json!({"mode": "free", "min_gen": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(game["min_gen"], 3);
        assert_eq!(game["max_gen"], 3);

        let id = game["id"].as_str().unwrap();
        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/ja/games/{}/guesses", id),
            Some(serde_json::json!({"guess": "ミズゴロウ"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "won");

        let (status, _) = send(
            &state,
            "POST",
            "/api/en/games",
            Some(serde_json::json!({"mode": "free", "min_gen": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_game() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), false);
        let (status, _) = send(&state, "GET", &format!("/api/en/games/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_future_daily_is_not_served() {
        let dir = tempfile::tempdir().unwrap();
        let today = Utc::now().date_naive();
        let tomorrow = today.succ_opt().unwrap();
        DailySchedule::new(today, vec!["Eevee".to_string(), "Mudkip".to_string()])
            .save(&dir.path().join("generated"), "en")
            .unwrap();
        let state = test_state(dir.path(), false);

        let (status, body) = send(
            &state,
            "POST",
            "/api/en/games",
            Some(serde_json::json!({"mode": "daily", "date": tomorrow})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["daily"], true);

        let uri = format!("/api/en/daily?date={}", tomorrow);
        let (status, _) = send(&state, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, game) = send(&state, "POST", "/api/en/games", Some(serde_json::json!({"mode": "daily"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(game["number"], 1);
        assert_eq!(game["answer"], Value::Null);
    }

    // ==================== Sessions ====================

    #[tokio::test]
    async fn test_oldest_sessions_dropped_past_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path(), false);
        app.max_sessions = 3;
        let state = Arc::new(app);

        let mut ids = Vec::new();
        for _ in 0..5 {
            let (status, game) = send(&state, "POST", "/api/en/games", Some(serde_json::json!({"mode": "free"}))).await;
            assert_eq!(status, StatusCode::CREATED);
            ids.push(game["id"].as_str().unwrap().to_string());
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        assert_eq!(state.games.read().await.len(), 3);
        let (status, _) = send(&state, "GET", &format!("/api/en/games/{}", ids[0]), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&state, "GET", &format!("/api/en/games/{}", ids[4]), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_prune_drops_expired_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path(), false);
        let game = || {
            let mut rng = rand::thread_rng();
            Game::free(&app.pokedex, 1, 3, 3, &mut rng).unwrap()
        };

        let now = Utc::now();
        let (stale, fresh) = (Uuid::new_v4(), Uuid::new_v4());
        let mut sessions = HashMap::new();
        sessions.insert(stale, Session { game: game(), touched: now - TimeDelta::hours(SESSION_TTL_HOURS + 1) });
        sessions.insert(fresh, Session { game: game(), touched: now - TimeDelta::hours(1) });

        assert_eq!(prune_sessions(&mut sessions, now, DEFAULT_MAX_SESSIONS), 1);
        assert!(sessions.contains_key(&fresh));
        assert!(!sessions.contains_key(&stale));
    }
}
