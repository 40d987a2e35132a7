//! solace-gateway: JSON API behind the wellness dashboard.
//!
//! Routes (all under `/api/v1`):
//! - `GET  /health`
//! - `POST /chat` `{message, session_id?, lang?}`
//! - `GET  /trends`
//! - `GET  /resources/:mood`, `GET /coping/:mood?count=N`
//! - `POST /journal` `{text}`, `GET /journal?limit=N`

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use solace_core::{AgentConfig, Language, Session, WellnessError, WellnessPipeline, DEFAULT_RECENT_LIMIT};
use solace_skills::{create_classifier, DictionaryTranslator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MAX_JOURNAL_LIMIT: usize = 50;
const MAX_SESSIONS: usize = 10_000;
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) struct SessionSlot {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pipeline: Arc<WellnessPipeline>,
    /// Per-session conversation state, keyed by the client's session id.
    pub(crate) sessions: Arc<DashMap<String, SessionSlot>>,
    max_sessions: usize,
}

impl AppState {
    pub(crate) fn new(pipeline: WellnessPipeline) -> Self {
        Self::with_session_limit(pipeline, MAX_SESSIONS)
    }

    pub(crate) fn with_session_limit(pipeline: WellnessPipeline, max_sessions: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(DashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    fn session(&self, id: &str) -> Arc<Mutex<Session>> {
        if !self.sessions.contains_key(id) && self.sessions.len() >= self.max_sessions {
            self.evict_oldest();
        }
        let now = Instant::now();
        let mut slot = self.sessions.entry(id.to_string()).or_insert_with(|| SessionSlot {
            session: Arc::new(Mutex::new(self.pipeline.new_session())),
            last_seen: now,
        });
        slot.last_seen = now;
        slot.session.clone()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|e| e.value().last_seen)
            .map(|e| e.key().clone());
        if let Some(id) = oldest {
            self.sessions.remove(&id);
            tracing::debug!(target: "solace::gateway", "Session limit reached; evicted least recently used session");
        }
    }

    /// Drops sessions not used for at least `max_idle`. Returns how many were removed.
    pub(crate) fn sweep_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, slot| slot.last_seen.elapsed() < max_idle);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(target: "solace::gateway", removed, "Idle sessions swept");
        }
        removed
    }
}

struct ApiError(WellnessError);

impl From<WellnessError> for ApiError {
    fn from(e: WellnessError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WellnessError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(target: "solace::gateway", error = %self.0, "request failed");
        }
        (status, Json(json!({ "status": "error", "error": self.0.to_string() }))).into_response()
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[solace-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AgentConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(target: "solace::gateway", error = %e, "Cannot start without a valid agent configuration");
            std::process::exit(1);
        }
    };
    let classifier = create_classifier(&config.agent.llm_mode);
    let pipeline = match WellnessPipeline::from_config(&config, classifier) {
        Ok(p) => p.with_translator(Arc::new(DictionaryTranslator::new())),
        Err(e) => {
            tracing::error!(target: "solace::gateway", error = %e, "Pipeline initialisation failed");
            std::process::exit(1);
        }
    };

    let state = AppState::new(pipeline);
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweeper.sweep_idle(SESSION_IDLE_TIMEOUT);
        }
    });
    let app = build_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], config.gateway.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "solace::gateway", %addr, error = %e, "Bind failed");
            std::process::exit(1);
        }
    };
    tracing::info!(target: "solace::gateway", %addr, "solace gateway listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!(target: "solace::gateway", "Shutdown requested");
    });
    if let Err(e) = server.await {
        tracing::error!(target: "solace::gateway", error = %e, "Server error");
    }
}

fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/trends", get(trends))
        .route("/api/v1/resources/:mood", get(resources))
        .route("/api/v1/coping/:mood", get(coping))
        .route("/api/v1/journal", post(save_journal).get(list_journal))
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "classifier": state.pipeline.classifier_name(),
        "sessions": state.sessions.len(),
    }))
}

#[derive(Deserialize)]
struct ChatBody {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    lang: Option<String>,
}

async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Result<Json<serde_json::Value>, ApiError> {
    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let session = state.session(&session_id);
    let mut session = session.lock().await;
    if let Some(lang) = body.lang.as_deref().and_then(Language::from_code) {
        session.language = lang;
    }
    let outcome = state.pipeline.process(&mut session, &body.message).await?;
    Ok(Json(json!({
        "session_id": session_id,
        "turns": session.memory.len(),
        "outcome": outcome,
    })))
}

async fn trends(State(state): State<AppState>) -> Result<Json<solace_core::TrendReport>, ApiError> {
    Ok(Json(state.pipeline.trends()?))
}

async fn resources(State(state): State<AppState>, Path(mood): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let links = state.pipeline.recommend_resources(&mood)?;
    Ok(Json(json!({
        "mood": solace_core::normalize_mood_label(&mood),
        "resources": links,
    })))
}

#[derive(Deserialize)]
struct CountQuery {
    count: Option<usize>,
}

async fn coping(
    State(state): State<AppState>,
    Path(mood): Path<String>,
    Query(q): Query<CountQuery>,
) -> Json<serde_json::Value> {
    let count = q.count.unwrap_or(state.pipeline.settings().suggestion_count);
    Json(json!({
        "mood": solace_core::normalize_mood_label(&mood),
        "suggestions": state.pipeline.suggest_coping(&mood, count),
    }))
}

#[derive(Deserialize)]
struct JournalBody {
    text: String,
}

async fn save_journal(
    State(state): State<AppState>,
    Json(body): Json<JournalBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let outcome = state.pipeline.save_journal_entry(&body.text)?;
    let status = if outcome.receipt.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!(outcome))))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn list_journal(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_RECENT_LIMIT).min(MAX_JOURNAL_LIMIT);
    let entries = state.pipeline.recent_journal_entries(limit)?;
    Ok(Json(json!({ "entries": entries })))
}
