use memeshelf_core::models::{Album, CreateAlbumRequest};
use memeshelf_core::{can_modify, AppError, Caller};
use memeshelf_db::AlbumRepositoryTrait;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// An album the caller may file media under.
///
/// Only [`AlbumService::choose`] builds one, and it only looks among the caller's
/// own albums, so holding an `AlbumChoice` is proof of ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlbumChoice {
    album_id: Uuid,
}

impl AlbumChoice {
    pub fn id(&self) -> Uuid {
        self.album_id
    }
}

#[derive(Clone)]
pub struct AlbumService {
    albums: Arc<dyn AlbumRepositoryTrait>,
}

impl AlbumService {
    pub fn new(albums: Arc<dyn AlbumRepositoryTrait>) -> Self {
        Self { albums }
    }

    #[tracing::instrument(skip(self, request), fields(user_id = %caller.user_id))]
    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateAlbumRequest,
    ) -> Result<Album, AppError> {
        let request = CreateAlbumRequest {
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            is_private: request.is_private,
        };
        request.validate()?;

        let album = self
            .albums
            .create(
                caller.user_id,
                &request.title,
                &request.description,
                request.is_private,
            )
            .await?;

        tracing::info!(album_id = %album.id, is_private = album.is_private, "Album created");
        Ok(album)
    }

    /// The caller's own albums, newest first. Elevated callers get theirs only too.
    pub async fn list_mine(&self, caller: &Caller) -> Result<Vec<Album>, AppError> {
        self.albums.list_by_owner(caller.user_id).await
    }

    /// Picks `album_id` out of the caller's selectable albums.
    pub async fn choose(&self, caller: &Caller, album_id: Uuid) -> Result<AlbumChoice, AppError> {
        self.list_mine(caller)
            .await?
            .into_iter()
            .find(|album| album.id == album_id)
            .map(|album| AlbumChoice { album_id: album.id })
            .ok_or_else(|| AppError::InvalidInput("Select a valid album".to_string()))
    }

    /// Deletes the album. Its media stay, without an album.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn delete(&self, caller: &Caller, album_id: Uuid) -> Result<(), AppError> {
        let album = self
            .albums
            .get(album_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Album not found".to_string()))?;

        if !can_modify(&album, caller) {
            return Err(AppError::Forbidden);
        }

        if !self.albums.delete(album_id).await? {
            return Err(AppError::NotFound("Album not found".to_string()));
        }
        tracing::info!(album_id = %album_id, "Album deleted");
        Ok(())
    }
}
