use crate::auth::Authenticated;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use memeshelf_core::models::{Comment, CommentPage, CreateCommentRequest};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentPageQuery {
    /// Comment page number; out-of-range values clamp to the last page
    pub cpage: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/comments",
    tag = "comments",
    params(
        ("id" = Uuid, Path, description = "Media ID"),
        CommentPageQuery
    ),
    responses(
        (status = 200, description = "Comments, newest first", body = CommentPage),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn list_comments(
    Authenticated(caller): Authenticated,
    Path(media_id): Path<Uuid>,
    Query(query): Query<CommentPageQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommentPage>, HttpAppError> {
    let page = state
        .comments
        .list(&caller, media_id, query.cpage.as_deref())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/v0/media/{id}/comments",
    tag = "comments",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Empty or overlong comment", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn add_comment(
    Authenticated(caller): Authenticated,
    Path(media_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let comment = state.comments.add(&caller, media_id, &request.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/comments/{id}",
    tag = "comments",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    )
)]
pub async fn delete_comment(
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HttpAppError> {
    state.comments.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
