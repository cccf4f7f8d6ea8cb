//! Feed listings. Both take `?tag=<slug>&page=<n>`.

use crate::auth::Authenticated;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use memeshelf_core::models::FeedPage;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// Tag slug to filter on
    pub tag: Option<String>,
    /// Page number; missing or non-numeric means 1, past the end means the last page
    pub page: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/feed",
    tag = "feed",
    params(FeedQuery),
    responses(
        (status = 200, description = "Newest public media", body = FeedPage)
    )
)]
pub async fn get_feed(
    Authenticated(caller): Authenticated,
    Query(query): Query<FeedQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeedPage>, HttpAppError> {
    let page = state
        .feed
        .latest(&caller, query.tag.as_deref(), query.page.as_deref())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v0/feed/random",
    tag = "feed",
    params(FeedQuery),
    responses(
        (status = 200, description = "Public media in random order", body = FeedPage),
        (status = 404, description = "Unknown tag", body = ErrorResponse)
    )
)]
pub async fn get_random_feed(
    Authenticated(caller): Authenticated,
    Query(query): Query<FeedQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeedPage>, HttpAppError> {
    let page = state
        .feed
        .random(&caller, query.tag.as_deref(), query.page.as_deref())
        .await?;
    Ok(Json(page))
}
