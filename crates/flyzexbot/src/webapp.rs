//! Read-only dashboard API + static frontend serving.
//!
//! Four JSON endpoints back the static dashboard under `webapp/static`:
//! pending applications, the XP leaderboard, the cup archive, and the
//! insights summary. Nothing mutates through this surface.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use flyzex_core::analytics::InsightsReport;
use flyzex_core::storage::Cup;
use flyzex_core::{i18n, Application, Settings, Storage};

// ============================================================================
// API PAYLOADS
// ============================================================================

/// `GET /api/applications/pending` response
#[derive(Debug, Serialize)]
pub struct PendingApplicationsResponse {
    pub total: usize,
    pub applications: Vec<Application>,
}

/// Query string of the chat-scoped endpoints (`/api/xp`, `/api/cups`)
#[derive(Debug, Deserialize)]
pub struct ChatScopedQuery {
    pub chat_id: Option<i64>,
    pub limit: Option<usize>,
}

/// One `/api/xp` leaderboard row
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub score: i64,
}

/// `GET /api/xp` response
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub chat_id: i64,
    pub limit: usize,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// `GET /api/cups` response
#[derive(Debug, Serialize)]
pub struct CupsResponse {
    pub chat_id: i64,
    pub limit: usize,
    pub cups: Vec<Cup>,
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Shared state for all endpoints
#[derive(Clone)]
pub struct WebAppState {
    pub storage: Arc<Storage>,
    pub settings: Arc<Settings>,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// API errors, rendered as `{"error": "..."}` with a matching status.
/// Message texts are Persian — the dashboard shows the body verbatim.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Creates the dashboard router.
pub fn create_webapp_router(storage: Arc<Storage>, settings: Arc<Settings>) -> Router {
    let static_dir = settings.webapp.static_dir.clone();
    let state = WebAppState { storage, settings };

    // The dashboard is same-origin, but CORS stays permissive so the API
    // can be polled from a separately hosted page as well.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/applications/pending", get(handle_pending_applications))
        .route("/api/applications/insights", get(handle_insights))
        .route("/api/xp", get(handle_xp_leaderboard))
        .route("/api/cups", get(handle_cups))
        // Static files (HTML, CSS, JS) for everything else
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Runs the dashboard web server until the process exits.
pub async fn run_webapp_server(storage: Arc<Storage>, settings: Arc<Settings>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", settings.webapp.host, settings.webapp.port);
    let app = create_webapp_router(storage, settings);

    log::info!("🌐 Starting dashboard server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "flyzexbot-webapp"
    }))
}

/// GET /api/applications/pending
async fn handle_pending_applications(State(state): State<Arc<WebAppState>>) -> Json<PendingApplicationsResponse> {
    let applications = state.storage.pending_applications().await;
    Json(PendingApplicationsResponse {
        total: applications.len(),
        applications,
    })
}

/// GET /api/xp?chat_id=..&limit=..
async fn handle_xp_leaderboard(
    State(state): State<Arc<WebAppState>>,
    Query(query): Query<ChatScopedQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let chat_id = require_chat_id(query.chat_id)?;
    let limit = query.limit.unwrap_or(state.settings.xp.leaderboard_size);

    let leaderboard = state
        .storage
        .xp_leaderboard(chat_id, limit)
        .await
        .into_iter()
        .map(|(user_id, score)| LeaderboardEntry { user_id, score })
        .collect();

    Ok(Json(LeaderboardResponse {
        chat_id,
        limit,
        leaderboard,
    }))
}

/// GET /api/cups?chat_id=..&limit=..
async fn handle_cups(
    State(state): State<Arc<WebAppState>>,
    Query(query): Query<ChatScopedQuery>,
) -> Result<Json<CupsResponse>, ApiError> {
    let chat_id = require_chat_id(query.chat_id)?;
    let limit = query.limit.unwrap_or(state.settings.cups.leaderboard_size);

    let cups = state.storage.cups(chat_id, limit).await;

    Ok(Json(CupsResponse { chat_id, limit, cups }))
}

/// GET /api/applications/insights
async fn handle_insights(State(state): State<Arc<WebAppState>>) -> Json<InsightsReport> {
    Json(state.storage.insights().await)
}

fn require_chat_id(chat_id: Option<i64>) -> Result<i64, ApiError> {
    chat_id.ok_or_else(|| ApiError::BadRequest(i18n::t(&i18n::fallback_lang(), "api-chat-id-required")))
}
