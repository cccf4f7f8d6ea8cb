use crate::auth::Authenticated;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use memeshelf_core::models::{Album, CreateAlbumRequest};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/albums",
    tag = "albums",
    responses(
        (status = 200, description = "The caller's albums, newest first", body = Vec<Album>)
    )
)]
pub async fn list_albums(
    Authenticated(caller): Authenticated,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Album>>, HttpAppError> {
    let albums = state.albums.list_mine(&caller).await?;
    Ok(Json(albums))
}

#[utoipa::path(
    post,
    path = "/api/v0/albums",
    tag = "albums",
    request_body = CreateAlbumRequest,
    responses(
        (status = 201, description = "Album created", body = Album),
        (status = 400, description = "Invalid title", body = ErrorResponse)
    )
)]
pub async fn create_album(
    Authenticated(caller): Authenticated,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateAlbumRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let album = state.albums.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(album)))
}

/// Delete an album. Its media stay, detached from it.
#[utoipa::path(
    delete,
    path = "/api/v0/albums/{id}",
    tag = "albums",
    params(
        ("id" = Uuid, Path, description = "Album ID")
    ),
    responses(
        (status = 204, description = "Album deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Album not found", body = ErrorResponse)
    )
)]
pub async fn delete_album(
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HttpAppError> {
    state.albums.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
