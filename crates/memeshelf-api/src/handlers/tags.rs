use crate::auth::Authenticated;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use memeshelf_core::models::{Tag, TagSuggestion};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Resolve free tag text to tags, creating the missing ones.
#[utoipa::path(
    get,
    path = "/api/v0/tags/resolve",
    tag = "tags",
    params(TagQuery),
    responses(
        (status = 200, description = "Resolved tags in input order", body = Vec<Tag>),
        (status = 400, description = "Tag text too long", body = ErrorResponse)
    )
)]
pub async fn resolve_tags(
    Authenticated(_caller): Authenticated,
    Query(query): Query<TagQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tag>>, HttpAppError> {
    let tags = state
        .tags
        .resolve(query.q.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(tags))
}

#[utoipa::path(
    get,
    path = "/api/v0/tags/suggestions",
    tag = "tags",
    params(TagQuery),
    responses(
        (status = 200, description = "Most used tags matching the query", body = Vec<TagSuggestion>)
    )
)]
pub async fn tag_suggestions(
    Authenticated(_caller): Authenticated,
    Query(query): Query<TagQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagSuggestion>>, HttpAppError> {
    let suggestions = state.tags.suggestions(query.q.as_deref()).await?;
    Ok(Json(suggestions))
}
