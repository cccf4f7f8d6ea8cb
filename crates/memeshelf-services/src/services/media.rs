//! Media lifecycle: create, edit, delete and visibility-checked reads.
//!
//! Every mutation passes the same capability check ([`can_modify`]); every read passes
//! [`can_view`], and media the caller may not see is reported exactly like missing
//! media. Deletion removes the record before the stored file, so a failure between
//! the two can only orphan a file, never leave a record pointing at nothing.

use memeshelf_core::models::{normalize_title, Media, NewMedia};
use memeshelf_core::tags::parse_and_validate;
use memeshelf_core::{can_modify, can_view, AppError, Caller};
use memeshelf_db::MediaRepositoryTrait;
use memeshelf_processing::{AcceptedUpload, UploadValidator};
use memeshelf_storage::keys::sanitize_filename;
use memeshelf_storage::{ByteStream, Storage};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::albums::AlbumChoice;
use super::tags::TagService;

/// A file submitted for upload with its form fields.
#[derive(Debug)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub title: String,
    pub tags: String,
    pub album: Option<AlbumChoice>,
}

#[derive(Clone)]
pub struct MediaLifecycleService {
    media: Arc<dyn MediaRepositoryTrait>,
    tags: TagService,
    storage: Arc<dyn Storage>,
    validator: UploadValidator,
}

impl MediaLifecycleService {
    pub fn new(
        media: Arc<dyn MediaRepositoryTrait>,
        tags: TagService,
        storage: Arc<dyn Storage>,
        validator: UploadValidator,
    ) -> Self {
        Self {
            media,
            tags,
            storage,
            validator,
        }
    }

    /// Runs the file acceptance checks alone, without storing anything.
    pub fn check_upload(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<AcceptedUpload, AppError> {
        Ok(self.validator.check(filename, content_type, data)?)
    }

    /// Accepts, stores and records an upload owned by `caller`.
    ///
    /// Rejections carry the failing check as [`AppError::Rejected`]. If the record
    /// insert fails after the file was written, the file is left behind and logged.
    #[tracing::instrument(
        skip(self, upload),
        fields(user_id = %caller.user_id, filename = %upload.filename, file_size = upload.data.len())
    )]
    pub async fn create(&self, caller: &Caller, upload: UploadRequest) -> Result<Media, AppError> {
        let start = Instant::now();

        let accepted = self.check_upload(&upload.filename, &upload.content_type, &upload.data)?;
        let title = normalize_title(&upload.title)?;
        let tag_names = parse_and_validate(&upload.tags)?;
        let original_filename = sanitize_filename(&upload.filename)?;
        let file_size = upload.data.len() as i64;

        let (storage_key, storage_url) = self
            .storage
            .upload(
                caller.user_id,
                &original_filename,
                &accepted.content_type,
                upload.data,
            )
            .await?;

        let new_media = NewMedia {
            id: Uuid::new_v4(),
            uploader_id: caller.user_id,
            title,
            storage_key: storage_key.clone(),
            storage_url,
            original_filename,
            content_type: accepted.content_type,
            file_size,
            media_type: accepted.media_type,
            album_id: upload.album.map(|choice| choice.id()),
            is_public: true,
        };

        let recorded = match self.tags.resolve_names(&tag_names).await {
            Ok(tags) => {
                let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
                self.media.create(new_media, &tag_ids).await
            }
            Err(e) => Err(e),
        };

        match recorded {
            Ok(media) => {
                tracing::info!(
                    media_id = %media.id,
                    storage_key = %media.storage_key,
                    media_type = ?media.media_type,
                    tag_count = media.tags.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Media created"
                );
                Ok(media)
            }
            Err(e) => {
                tracing::warn!(
                    storage_key = %storage_key,
                    error = %e,
                    "Media record not created; stored file is orphaned"
                );
                Err(e)
            }
        }
    }

    /// The media if `caller` may see it, otherwise the same NotFound as a missing id.
    pub async fn get_visible(&self, caller: &Caller, media_id: Uuid) -> Result<Media, AppError> {
        self.media
            .get(media_id)
            .await?
            .filter(|media| can_view(media, caller))
            .ok_or_else(AppError::media_not_found)
    }

    /// A visible media and a stream of its stored bytes.
    pub async fn open_file(
        &self,
        caller: &Caller,
        media_id: Uuid,
    ) -> Result<(Media, ByteStream), AppError> {
        let media = self.get_visible(caller, media_id).await?;
        let stream = self.storage.download_stream(&media.storage_key).await?;
        Ok((media, stream))
    }

    async fn get_modifiable(&self, caller: &Caller, media_id: Uuid) -> Result<Media, AppError> {
        let media = self.get_visible(caller, media_id).await?;
        if !can_modify(&media, caller) {
            tracing::debug!(media_id = %media_id, user_id = %caller.user_id, "Media change refused");
            return Err(AppError::Forbidden);
        }
        Ok(media)
    }

    #[tracing::instrument(skip(self, raw_title), fields(user_id = %caller.user_id))]
    pub async fn update_title(
        &self,
        caller: &Caller,
        media_id: Uuid,
        raw_title: &str,
    ) -> Result<Media, AppError> {
        self.get_modifiable(caller, media_id).await?;
        let title = normalize_title(raw_title)?;

        self.media
            .update_title(media_id, title.as_deref())
            .await?
            .ok_or_else(AppError::media_not_found)
    }

    /// Replaces the media's tag set with the tags resolved from `raw_tags`.
    #[tracing::instrument(skip(self, raw_tags), fields(user_id = %caller.user_id))]
    pub async fn update_tags(
        &self,
        caller: &Caller,
        media_id: Uuid,
        raw_tags: &str,
    ) -> Result<Media, AppError> {
        self.get_modifiable(caller, media_id).await?;
        let tags = self.tags.resolve(raw_tags).await?;
        let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();

        self.media
            .replace_tags(media_id, &tag_ids)
            .await?
            .ok_or_else(AppError::media_not_found)
    }

    /// Deletes the record, then the stored file on a best-effort basis.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn delete(&self, caller: &Caller, media_id: Uuid) -> Result<(), AppError> {
        self.get_modifiable(caller, media_id).await?;

        let storage_key = self
            .media
            .delete(media_id)
            .await?
            .ok_or_else(AppError::media_not_found)?;

        match self.storage.delete(&storage_key).await {
            Ok(true) => {
                tracing::info!(media_id = %media_id, storage_key = %storage_key, "Media deleted");
            }
            Ok(false) => {
                tracing::warn!(
                    media_id = %media_id,
                    storage_key = %storage_key,
                    "Media deleted but stored file was already missing"
                );
            }
            Err(e) => {
                tracing::error!(
                    media_id = %media_id,
                    storage_key = %storage_key,
                    error = %e,
                    "Media deleted but stored file could not be removed"
                );
            }
        }
        Ok(())
    }
}
