//! Media handlers: upload, read, file download, edits and delete.

use crate::auth::Authenticated;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use memeshelf_core::models::{Media, UpdateTagsRequest, UpdateTitleRequest};
use memeshelf_core::AppError;
use memeshelf_services::UploadRequest;
use std::sync::Arc;
use uuid::Uuid;

/// Upload a meme
///
/// Multipart fields: `file` (required), `title`, `tags` (free text separated by
/// `,`, `#` or `;`) and `album_id` (one of the caller's albums).
#[utoipa::path(
    post,
    path = "/api/v0/media",
    tag = "media",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Media uploaded", body = Media),
        (status = 400, description = "Upload rejected or invalid form", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %caller.user_id, operation = "upload_media")
)]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    Authenticated(caller): Authenticated,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = extract_upload_form(multipart).await?;

    // File rejections win over album errors
    state
        .media
        .check_upload(&form.filename, &form.content_type, &form.data)?;

    let album = match form.album_id {
        Some(album_id) => Some(state.albums.choose(&caller, album_id).await?),
        None => None,
    };

    let media = state
        .media
        .create(
            &caller,
            UploadRequest {
                filename: form.filename,
                content_type: form.content_type,
                data: form.data,
                title: form.title,
                tags: form.tags,
                album,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(media)))
}

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media found", body = Media),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn get_media(
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Media>, HttpAppError> {
    let media = state.media.get_visible(&caller, id).await?;
    Ok(Json(media))
}

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/file",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media file", content_type = "application/octet-stream"),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn download_media_file(
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let (media, stream) = state.media.open_file(&caller, id).await?;

    tracing::debug!(media_id = %id, storage_key = %media.storage_key, "Streaming file from storage");

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename*=UTF-8''{}",
                urlencoding::encode(&media.original_filename)
            ),
        )
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            AppError::Internal(e.to_string()).into()
        })
}

/// Set or clear a media title. A blank title clears it.
#[utoipa::path(
    put,
    path = "/api/v0/media/{id}/title",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = UpdateTitleRequest,
    responses(
        (status = 200, description = "Title updated", body = Media),
        (status = 400, description = "Title too long", body = ErrorResponse),
        (status = 403, description = "Not the uploader", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn update_title(
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdateTitleRequest>,
) -> Result<Json<Media>, HttpAppError> {
    let media = state.media.update_title(&caller, id, &request.title).await?;
    Ok(Json(media))
}

/// Replace a media's tags with the ones parsed from `tags`.
#[utoipa::path(
    put,
    path = "/api/v0/media/{id}/tags",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = UpdateTagsRequest,
    responses(
        (status = 200, description = "Tags replaced", body = Media),
        (status = 400, description = "Invalid tag text", body = ErrorResponse),
        (status = 403, description = "Not the uploader", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn update_tags(
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdateTagsRequest>,
) -> Result<Json<Media>, HttpAppError> {
    let media = state.media.update_tags(&caller, id, &request.tags).await?;
    Ok(Json(media))
}

#[utoipa::path(
    delete,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 204, description = "Media deleted successfully"),
        (status = 403, description = "Not the uploader", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %caller.user_id, media_id = %id, operation = "delete_media")
)]
pub async fn delete_media(
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HttpAppError> {
    state.media.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
