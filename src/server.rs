//! HTTP surface over [`Search`].
//!
//! Parameters are read from the query string and the body (JSON object or
//! urlencoded form) and merged into one flat map, body fields winning. Each
//! string value is parsed as JSON when it parses, and kept raw otherwise, so
//! `?showUrl=false` yields a boolean and `?query=["a","b"]` two terms.
//!
//! A missing or empty `query` is rejected with 400 before any search runs.
//! Provider outages are not errors: they produce empty results with 200.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{ProviderKind, QueryTerms, Search, SearchResult};

const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
struct AppState {
    search: Arc<Search>,
    started_ms: u64,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// Missing/empty `query`, or an unreadable body.
    InvalidBody,
    /// Route kept only to point callers at its replacement.
    Deprecated(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidBody => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid body" })),
            )
                .into_response(),
            ApiError::Deprecated(replacement) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("This path has been deprecated. Please use: '{replacement}'")
                })),
            )
                .into_response(),
        }
    }
}

/// Flat request parameters merged from query string and body.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params(pub Map<String, Value>);

impl Params {
    /// Merges urlencoded pairs; repeated keys accumulate into an array.
    fn merge_pairs(&mut self, encoded: &[u8]) {
        let mut merged: Map<String, Value> = Map::new();
        for (key, value) in url::form_urlencoded::parse(encoded) {
            let value = parse_scalar(&value);
            match merged.get_mut(key.as_ref()) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    merged.insert(key.into_owned(), value);
                }
            }
        }
        self.0.extend(merged);
    }

    fn merge_json(&mut self, body: &[u8]) -> Result<(), ApiError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => {
                for (key, value) in fields {
                    let value = match value {
                        Value::String(raw) => parse_scalar(&raw),
                        other => other,
                    };
                    self.0.insert(key, value);
                }
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(_) => Err(ApiError::InvalidBody),
        }
    }

    /// Query terms from `query`: a string, a non-zero number, or an array of
    /// strings and numbers.
    pub fn terms(&self) -> Option<QueryTerms> {
        let raw: Vec<String> = match self.0.get("query")? {
            Value::Number(n) if n.as_f64() == Some(0.0) => return None,
            Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
            other => scalar_text(other).into_iter().collect(),
        };
        QueryTerms::new(raw).ok()
    }

    /// `showUrl` flag, defaulting to true.
    pub fn show_url(&self) -> bool {
        match self.0.get("showUrl") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => true,
        }
    }
}

impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let mut params = Params::default();
        if let Some(query) = req.uri().query() {
            params.merge_pairs(query.as_bytes());
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let body = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
            .await
            .map_err(|_| ApiError::InvalidBody)?;
        if body.is_empty() {
            return Ok(params);
        }

        if content_type.starts_with("application/json") {
            params.merge_json(&body)?;
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            params.merge_pairs(&body);
        }
        Ok(params)
    }
}

/// JSON value of `raw`, or `raw` itself as a string.
fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn plain_text(body: String) -> Response {
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

async fn structured(
    state: &AppState,
    kind: ProviderKind,
    params: &Params,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    let terms = params.terms().ok_or(ApiError::InvalidBody)?;
    debug!("{} search for {} term(s)", kind, terms.len());
    Ok(Json(state.search.search(kind, &terms).await))
}

async fn summary(state: &AppState, kind: ProviderKind, params: &Params) -> Result<Response, ApiError> {
    let terms = params.terms().ok_or(ApiError::InvalidBody)?;
    let text = state.search.summary(kind, params.show_url(), &terms).await;
    Ok(plain_text(text))
}

async fn index() -> Json<Value> {
    Json(json!({ "t": now_ms() }))
}

async fn started(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "t": state.started_ms }))
}

async fn wakeup() -> &'static str {
    "OK"
}

async fn google_this() -> ApiError {
    ApiError::Deprecated("/google-search")
}

async fn google_result() -> ApiError {
    ApiError::Deprecated("/google-search-summary")
}

async fn google_search(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    structured(&state, ProviderKind::Google, &params).await
}

async fn ddg_search(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    structured(&state, ProviderKind::DuckDuckGo, &params).await
}

async fn api_search(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    structured(&state, ProviderKind::JsonApi, &params).await
}

async fn google_search_summary(State(state): State<AppState>, params: Params) -> Result<Response, ApiError> {
    summary(&state, ProviderKind::Google, &params).await
}

async fn ddg_search_summary(State(state): State<AppState>, params: Params) -> Result<Response, ApiError> {
    summary(&state, ProviderKind::DuckDuckGo, &params).await
}

async fn api_search_summary(State(state): State<AppState>, params: Params) -> Result<Response, ApiError> {
    summary(&state, ProviderKind::JsonApi, &params).await
}

async fn google_search_digest(State(state): State<AppState>, params: Params) -> Result<Response, ApiError> {
    let terms = params.terms().ok_or(ApiError::InvalidBody)?;
    let text = state
        .search
        .digest(ProviderKind::Google, params.show_url(), &terms)
        .await;
    Ok(plain_text(text))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Builds the HTTP router.
pub fn router(search: Arc<Search>) -> Router {
    let state = AppState {
        search,
        started_ms: now_ms(),
    };

    Router::new()
        .route("/", get(index))
        .route("/started", get(started))
        .route("/wakeup", post(wakeup))
        .route("/googlethis", any(google_this))
        .route("/googleresult", any(google_result))
        .route("/google-search", any(google_search))
        .route("/ddg-search", any(ddg_search))
        .route("/api-search", any(api_search))
        .route("/google-search-summary", any(google_search_summary))
        .route("/ddg-search-summary", any(ddg_search_summary))
        .route("/api-search-summary", any(api_search_summary))
        .route("/google-search-digest", any(google_search_digest))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router on `addr` until Ctrl-C.
pub async fn serve(search: Arc<Search>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(search))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
