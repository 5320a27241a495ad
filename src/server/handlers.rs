use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State, rejection::PathRejection},
};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{
    error::{AppError, AppResult},
    state::AppState,
};
use crate::{
    prompts::{Category, PromptFilter, PromptItem, PromptSource, catalog},
    trending::server_trending,
};

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /api/trending`: today's selection, identical for every caller on the same UTC day
pub async fn trending<S: PromptSource>(
    State(state): State<AppState<S>>,
) -> Json<Vec<PromptItem>> {
    let all = state.prompts.prompts().await;
    Json(server_trending(&all, state.clock.now()))
}

/// `GET /api/prompts?category=&q=`
pub async fn list_prompts<S: PromptSource>(
    State(state): State<AppState<S>>,
    Query(filter): Query<PromptFilter>,
) -> Json<Vec<PromptItem>> {
    let all = state.prompts.prompts().await;
    let matched: Vec<PromptItem> = catalog::filter(&all, &filter)
        .into_iter()
        .cloned()
        .collect();
    debug!(?filter, count = matched.len(), "Filtered prompts");
    Json(matched)
}

/// `GET /api/prompts/{id}`
pub async fn get_prompt<S: PromptSource>(
    State(state): State<AppState<S>>,
    id: Result<Path<u32>, PathRejection>,
) -> AppResult<Json<PromptItem>> {
    let Path(id) = id?;
    let all = state.prompts.prompts().await;
    catalog::find(&all, id)
        .cloned()
        .map(Json)
        .ok_or(AppError::PromptNotFound(id))
}

/// `GET /api/categories`
pub async fn list_categories<S: PromptSource>(
    State(state): State<AppState<S>>,
) -> Json<Vec<Category>> {
    let all = state.prompts.prompts().await;
    Json(catalog::categories(&all))
}

pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    warn!(%uri, "No route");
    AppError::RouteNotFound(uri.path().to_string())
}
