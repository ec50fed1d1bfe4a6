use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use parking_lot::RwLock;
use search_core::corpus::{load_corpus, InputDoc};
use search_core::{
    DocId, Document, DocumentFilter, DocumentStatus, EngineConfig, ExecutionPolicy, SearchError,
    SearchServer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Document>,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub doc_id: DocId,
    pub words: Vec<String>,
    pub status: DocumentStatus,
}

#[derive(Serialize)]
pub struct DocumentsResponse {
    pub count: usize,
    pub ids: Vec<DocId>,
}

/// Startup settings for [`build_app`].
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub stop_words: String,
    pub corpus: Option<PathBuf>,
    pub engine: EngineConfig,
    /// Required in `X-ADMIN-TOKEN` by mutating endpoints
    pub admin_token: Option<String>,
}

/// Queries share the read half of the lock; adds and removals take the write
/// half, so no document changes while a ranking call is in flight.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<SearchServer>>,
    pub admin_token: Option<String>,
}

pub fn build_app(options: AppOptions) -> Result<Router> {
    let stop_words = options.stop_words.split(' ');
    let mut engine = SearchServer::with_config(stop_words, options.engine)?;
    if let Some(corpus) = &options.corpus {
        load_corpus(&mut engine, corpus)?;
    }
    let app_state = AppState { engine: Arc::new(RwLock::new(engine)), admin_token: options.admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match/:doc_id", get(match_handler))
        .route("/documents", get(list_documents).post(add_document))
        .route("/documents/:doc_id", axum::routing::delete(remove_document))
        .route("/documents/:doc_id/frequencies", get(frequencies_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

fn error_response(err: SearchError) -> ApiError {
    let status = match err {
        SearchError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SearchError::NotFound(_) => StatusCode::NOT_FOUND,
        SearchError::ThreadPool(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let filter = params.status.map(DocumentFilter::from).unwrap_or_default();
    let policy = if params.parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };
    let (results, total_hits) = state
        .engine
        .read()
        .find_top_documents_counted(policy, &params.q, &filter)
        .map_err(error_response)?;

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, took_s = elapsed.as_secs_f64(), "search");
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
    Query(params): Query<MatchParams>,
) -> Result<Json<MatchResponse>, ApiError> {
    let (words, status) = state
        .engine
        .read()
        .match_document(&params.q, doc_id)
        .map_err(error_response)?;
    Ok(Json(MatchResponse { doc_id, words, status }))
}

pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentsResponse> {
    let engine = state.engine.read();
    Json(DocumentsResponse { count: engine.document_count(), ids: engine.ids().collect() })
}

pub async fn frequencies_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Json<BTreeMap<String, f64>> {
    Json(state.engine.read().word_frequencies(doc_id))
}

// --- Admin endpoints ---
async fn add_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(doc): Json<InputDoc>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    authorize(&state, &headers)?;
    state
        .engine
        .write()
        .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": doc.id }))))
}

async fn remove_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocId>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    state.engine.write().remove_document(doc_id);
    Ok(StatusCode::NO_CONTENT)
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
