//! HTTP surface of the memory daemon.
//!
//! Wires the database, the embedding client, and the engine modules into an
//! axum router. Handlers validate input first, then embed (network-bound),
//! then run the store operation — both blocking steps go through
//! `tokio::task::spawn_blocking` so request workers stay responsive.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::config::MnemoConfig;
use crate::db;
use crate::embedding::{self, Embedder};
use crate::error::MnemoError;
use crate::memory::chunks::{self, ChunkSearchResponse, SessionSearchResponse};
use crate::memory::recall::{self, RecallResponse};
use crate::memory::stats::{self, StatsResponse};
use crate::memory::store::{self, StoreOutcome};
use crate::memory::supersede::{self, SupersedeOutcome};
use crate::memory::types::LearningDraft;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    embedder: Arc<dyn Embedder>,
    config: Arc<MnemoConfig>,
}

/// Start the HTTP server. Blocks until ctrl-c.
pub async fn serve(config: MnemoConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;

    // Warn when the stored vectors were produced by a different model —
    // similarities across models are meaningless.
    if let Ok(Some(stored_model)) = db::migrations::get_embedding_model(&conn) {
        if stored_model != config.embedding.model {
            tracing::warn!(
                stored = %stored_model,
                configured = %config.embedding.model,
                "embedding model changed — existing vectors are stale"
            );
        }
    }

    let embedder: Arc<dyn Embedder> = Arc::from(embedding::create_embedder(&config.embedding)?);
    tracing::info!(model = embedder.model(), "embedding client ready");

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        embedder,
        config: Arc::new(config),
    };

    let router = Router::new()
        .route("/store", post(handle_store))
        .route("/recall", post(handle_recall))
        .route("/supersede", post(handle_supersede))
        .route("/chunks/store", post(handle_store_chunk))
        .route("/chunks/search", post(handle_search_chunks))
        .route("/chunks/sessions", post(handle_find_sessions))
        .route("/stats", get(handle_stats))
        .route("/health", get(handle_health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "memory daemon listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

// ── Request bodies ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StoreRequest {
    pub r#type: String,
    pub content: String,
    pub context: Option<String>,
    pub confidence: Option<f64>,
    pub session_source: Option<String>,
    pub source_type: Option<String>,
    pub scope: Option<String>,
    pub tags: Option<Vec<String>>,
    pub related_files: Option<Vec<String>>,
    pub derived_from: Option<i64>,
    pub supersedes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RecallRequest {
    pub query: String,
    #[serde(rename = "minSimilarity")]
    pub min_similarity: Option<f64>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SupersedeRequest {
    pub old_id: i64,
    pub new_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct StoreChunkRequest {
    pub session_id: String,
    pub chunk_index: i64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionSearchRequest {
    pub query: String,
    #[serde(rename = "minSimilarity")]
    pub min_similarity: Option<f64>,
    #[serde(rename = "maxSessions")]
    pub max_sessions: Option<usize>,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn handle_store(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreOutcome>, MnemoError> {
    if req.r#type.trim().is_empty() {
        return Err(MnemoError::Validation("'type' must not be empty".into()));
    }
    if req.content.trim().is_empty() {
        return Err(MnemoError::Validation("'content' must not be empty".into()));
    }
    if let Some(confidence) = req.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(MnemoError::Validation(
                "'confidence' must be between 0.0 and 1.0".into(),
            ));
        }
    }

    let embedding = embed_text(&state, req.content.clone()).await?;

    let draft = LearningDraft {
        learning_type: req.r#type,
        content: req.content,
        context: req.context,
        confidence: req.confidence,
        session_source: req.session_source,
        source_type: req.source_type,
        scope: req.scope,
        tags: req.tags,
        related_files: req.related_files,
        derived_from: req.derived_from,
        supersedes: req.supersedes,
    };
    let duplicate_threshold = state.config.recall.duplicate_threshold;

    let outcome = with_db(&state, move |conn| {
        store::store_learning(conn, &draft, &embedding, duplicate_threshold)
    })
    .await?;

    Ok(Json(outcome))
}

async fn handle_recall(
    State(state): State<AppState>,
    Json(req): Json<RecallRequest>,
) -> Result<Json<RecallResponse>, MnemoError> {
    if req.query.trim().is_empty() {
        return Err(MnemoError::Validation("'query' must not be empty".into()));
    }

    let min_similarity = req.min_similarity.unwrap_or(state.config.recall.min_similarity);
    let max_results = req.max_results.unwrap_or(state.config.recall.max_results);

    let embedding = embed_text(&state, req.query).await?;

    let response = with_db(&state, move |conn| {
        recall::recall(conn, &embedding, min_similarity, max_results)
    })
    .await?;

    Ok(Json(response))
}

async fn handle_supersede(
    State(state): State<AppState>,
    Json(req): Json<SupersedeRequest>,
) -> Result<Json<SupersedeOutcome>, MnemoError> {
    let outcome = with_db(&state, move |conn| {
        supersede::supersede(conn, req.old_id, req.new_id)
    })
    .await?;
    Ok(Json(outcome))
}

async fn handle_store_chunk(
    State(state): State<AppState>,
    Json(req): Json<StoreChunkRequest>,
) -> Result<Json<serde_json::Value>, MnemoError> {
    if req.session_id.trim().is_empty() {
        return Err(MnemoError::Validation("'session_id' must not be empty".into()));
    }
    if req.chunk_index < 0 {
        return Err(MnemoError::Validation("'chunk_index' must not be negative".into()));
    }
    if req.content.trim().is_empty() {
        return Err(MnemoError::Validation("'content' must not be empty".into()));
    }

    let embedding = embed_text(&state, req.content.clone()).await?;

    let session_id = req.session_id.clone();
    let chunk_index = req.chunk_index;
    with_db(&state, move |conn| {
        chunks::upsert_chunk(conn, &req.session_id, req.chunk_index, &req.content, &embedding)
    })
    .await?;

    Ok(Json(json!({
        "status": "stored",
        "session_id": session_id,
        "chunk_index": chunk_index,
    })))
}

async fn handle_search_chunks(
    State(state): State<AppState>,
    Json(req): Json<RecallRequest>,
) -> Result<Json<ChunkSearchResponse>, MnemoError> {
    if req.query.trim().is_empty() {
        return Err(MnemoError::Validation("'query' must not be empty".into()));
    }

    let min_similarity = req.min_similarity.unwrap_or(state.config.chunks.min_similarity);
    let max_results = req.max_results.unwrap_or(state.config.chunks.max_results);

    let embedding = embed_text(&state, req.query).await?;

    let response = with_db(&state, move |conn| {
        chunks::search_chunks(conn, &embedding, min_similarity, max_results)
    })
    .await?;

    Ok(Json(response))
}

async fn handle_find_sessions(
    State(state): State<AppState>,
    Json(req): Json<SessionSearchRequest>,
) -> Result<Json<SessionSearchResponse>, MnemoError> {
    if req.query.trim().is_empty() {
        return Err(MnemoError::Validation("'query' must not be empty".into()));
    }

    let min_similarity = req.min_similarity.unwrap_or(state.config.chunks.min_similarity);
    let max_sessions = req.max_sessions.unwrap_or(state.config.chunks.max_sessions);

    let embedding = embed_text(&state, req.query).await?;

    let response = with_db(&state, move |conn| {
        chunks::find_relevant_sessions(conn, &embedding, min_similarity, max_sessions)
    })
    .await?;

    Ok(Json(response))
}

async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, MnemoError> {
    let db_path = state.config.resolved_db_path();
    let response = with_db(&state, move |conn| {
        stats::memory_stats(conn, Some(&db_path))
    })
    .await?;
    Ok(Json(response))
}

/// Health is degraded-not-fatal: an unreachable embedding service reports
/// `degraded`, it never errors.
async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let embedder = Arc::clone(&state.embedder);
    let embedding_ok = tokio::task::spawn_blocking(move || embedder.is_healthy())
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if embedding_ok { "ok" } else { "degraded" },
        "embedding_service": embedding_ok,
        "model": state.embedder.model(),
        "db_path": state.config.resolved_db_path().display().to_string(),
    }))
}

// ── Plumbing ──────────────────────────────────────────────────────────────────

/// Embed text on the blocking pool; any embedder failure fails the request.
async fn embed_text(state: &AppState, text: String) -> Result<Vec<f32>, MnemoError> {
    let embedder = Arc::clone(&state.embedder);
    tokio::task::spawn_blocking(move || embedder.embed(&text))
        .await
        .map_err(|e| MnemoError::Internal(format!("embedding task failed: {e}")))?
        .map_err(MnemoError::from)
}

/// Run a database operation on the blocking pool under the shared connection.
async fn with_db<T, F>(state: &AppState, op: F) -> Result<T, MnemoError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, MnemoError> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    tokio::task::spawn_blocking(move || {
        let mut conn = db
            .lock()
            .map_err(|e| MnemoError::Internal(format!("db lock poisoned: {e}")))?;
        op(&mut conn)
    })
    .await
    .map_err(|e| MnemoError::Internal(format!("db task failed: {e}")))?
}
