//! HTTP request handlers

use super::state::AppState;
use crate::cache::CacheStats;
use crate::results::ProviderResults;
use crate::search::{SearchError, SearchQuery};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

/// Largest `num_results` a client may ask for
pub const MAX_NUM_RESULTS: u32 = 50;

/// Search request, from a JSON body or a query string
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchRequest {
    /// Search query
    pub query: String,
    /// Provider to search (all providers when absent)
    #[serde(default)]
    pub engine: Option<String>,
    /// Number of results to request from each provider
    #[serde(default = "default_num_results")]
    pub num_results: u32,
    /// 1-based index of the first result
    #[serde(default = "default_start_index")]
    pub start_index: u32,
    /// Use the result cache, if enabled for this instance
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_num_results() -> u32 {
    10
}

fn default_start_index() -> u32 {
    1
}

fn default_use_cache() -> bool {
    true
}

impl SearchRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if !(1..=MAX_NUM_RESULTS).contains(&self.num_results) {
            return Err(ApiError::BadRequest(format!(
                "num_results must be between 1 and {}",
                MAX_NUM_RESULTS
            )));
        }
        if self.start_index < 1 {
            return Err(ApiError::BadRequest(
                "start_index must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Requested provider; blank values mean every provider
    fn engine(&self) -> Option<&str> {
        self.engine
            .as_deref()
            .map(str::trim)
            .filter(|engine| !engine.is_empty())
    }

    /// Orchestrator query; `num` and `start` are forwarded to providers and
    /// cache keys
    fn to_query(&self, use_cache: bool) -> SearchQuery {
        let query = SearchQuery::simple(self.query.clone())
            .with_cache(use_cache)
            .with_param("num", self.num_results)
            .with_param("start", self.start_index);

        match self.engine() {
            Some(engine) => query.with_provider(engine),
            None => query,
        }
    }
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    /// Providers that were searched, in registration order
    pub engines_used: Vec<String>,
    pub total_results: usize,
    pub results: ProviderResults,
    pub metadata: serde_json::Value,
    pub cache_info: CacheInfo,
}

/// How much of a response came from the cache
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheInfo {
    /// Cache consulted for this request
    pub enabled: bool,
    /// At least one provider was served from the cache, even with no results
    pub used: bool,
    pub cache_result_count: usize,
    pub cache_result_percentage: String,
}

#[derive(Debug, Serialize)]
pub struct EngineInfo {
    pub name: String,
    pub is_available: bool,
    pub description: Option<String>,
    pub website: Option<String>,
    pub requires_api_key: bool,
}

#[derive(Debug, Serialize)]
pub struct AvailableEnginesResponse {
    pub engines: Vec<EngineInfo>,
    pub total: usize,
}

/// Errors returned to HTTP clients as `{"detail": ...}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Search(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Search request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Search handler for JSON bodies
pub async fn search_post(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, request).await.map(Json)
}

/// Search handler for query strings
pub async fn search_get(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, request).await.map(Json)
}

async fn run_search(state: &AppState, request: SearchRequest) -> Result<SearchResponse, ApiError> {
    request.validate()?;

    // Decided once so every provider in a fan-out sees the same setting
    let use_cache = state.cache_enabled() && request.use_cache;

    let outcome = state.search.execute(&request.to_query(use_cache)).await?;
    let cache_used = outcome.cache_used();
    let results = outcome.results;

    let engines_used: Vec<String> = state
        .search
        .available_providers()
        .into_iter()
        .filter(|name| results.contains_key(name))
        .collect();

    let items = || results.values().flat_map(|r| r.iter());
    let total_results = items().count();
    let cache_result_count = items().filter(|r| r.is_from_cache).count();

    Ok(SearchResponse {
        query: request.query.clone(),
        engines_used,
        total_results,
        metadata: json!({
            "request_params": {
                "num_results": request.num_results,
                "start_index": request.start_index,
                "use_cache": request.use_cache,
            }
        }),
        cache_info: CacheInfo {
            enabled: use_cache,
            used: cache_used,
            cache_result_count,
            cache_result_percentage: percentage(cache_result_count, total_results),
        },
        results,
    })
}

fn percentage(part: usize, total: usize) -> String {
    let value = if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    };
    format!("{:.2}%", value)
}

/// Registered providers
pub async fn engines(State(state): State<AppState>) -> Json<AvailableEnginesResponse> {
    let registry = state.search.registry();
    let engines: Vec<EngineInfo> = registry
        .names()
        .into_iter()
        .map(|name| {
            let about = registry.about(name).unwrap_or_default();
            EngineInfo {
                name: name.to_string(),
                is_available: true,
                description: about.description,
                website: about.website,
                requires_api_key: about.require_api_key,
            }
        })
        .collect();

    Json(AvailableEnginesResponse {
        total: engines.len(),
        engines,
    })
}

/// Cache statistics
pub async fn cache_stats(State(state): State<AppState>) -> impl IntoResponse {
    if !state.cache_enabled() {
        return Json(json!({ "status": "disabled", "message": "Result cache is disabled" }));
    }

    let stats: CacheStats = state.search.cache_stats();
    Json(json!({
        "status": "enabled",
        "stats": {
            "hits": stats.hits,
            "misses": stats.misses,
            "expirations": stats.expirations,
            "items_count": stats.item_count,
            "hit_rate": stats.hit_rate_percent(),
            "ttl": state.search.cache().default_ttl(),
        }
    }))
}

/// Drop every cached result set
pub async fn clear_cache(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_cache_enabled(&state)?;
    state.search.clear_cache();
    Ok(Json(json!({ "status": "success", "message": "Cache cleared" })))
}

/// Drop expired cached result sets
pub async fn clear_expired_cache(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_cache_enabled(&state)?;
    let cleared_count = state.search.clear_expired_cache();
    Ok(Json(json!({
        "status": "success",
        "message": format!("Cleared {} expired cache entries", cleared_count),
        "cleared_count": cleared_count,
    })))
}

fn ensure_cache_enabled(state: &AppState) -> Result<(), ApiError> {
    if state.cache_enabled() {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Result cache is disabled".to_string()))
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "environment": state.settings.general.app_env,
        "version": crate::VERSION
    }))
}
