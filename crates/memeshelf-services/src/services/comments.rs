use memeshelf_core::models::{Comment, CommentPage, MAX_COMMENT_LENGTH};
use memeshelf_core::{can_modify, can_view, AppError, Caller, PageWindow};
use memeshelf_db::{CommentRepositoryTrait, MediaRepositoryTrait};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepositoryTrait>,
    media: Arc<dyn MediaRepositoryTrait>,
    page_size: u32,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepositoryTrait>,
        media: Arc<dyn MediaRepositoryTrait>,
        page_size: u32,
    ) -> Self {
        Self {
            comments,
            media,
            page_size,
        }
    }

    async fn ensure_visible(&self, caller: &Caller, media_id: Uuid) -> Result<(), AppError> {
        match self.media.get(media_id).await? {
            Some(media) if can_view(&media, caller) => Ok(()),
            _ => Err(AppError::media_not_found()),
        }
    }

    #[tracing::instrument(skip(self, text), fields(user_id = %caller.user_id))]
    pub async fn add(
        &self,
        caller: &Caller,
        media_id: Uuid,
        text: &str,
    ) -> Result<Comment, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("Comment cannot be empty".to_string()));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Comment must be at most {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        self.ensure_visible(caller, media_id).await?;
        let comment = self.comments.create(media_id, caller.user_id, text).await?;
        tracing::debug!(comment_id = %comment.id, media_id = %media_id, "Comment added");
        Ok(comment)
    }

    /// One page of comments, newest first. `page` is the raw query value.
    pub async fn list(
        &self,
        caller: &Caller,
        media_id: Uuid,
        page: Option<&str>,
    ) -> Result<CommentPage, AppError> {
        self.ensure_visible(caller, media_id).await?;

        let count = self.comments.count_for_media(media_id).await?;
        let window = PageWindow::resolve(page, count, self.page_size);
        let items = self
            .comments
            .list_for_media(media_id, window.limit(), window.offset())
            .await?;

        Ok(CommentPage {
            items,
            count,
            page: window.page,
            num_pages: window.num_pages,
            has_next: window.has_next(),
            next_page_number: window.next_page_number(),
        })
    }

    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn delete(&self, caller: &Caller, comment_id: Uuid) -> Result<(), AppError> {
        let comment = self
            .comments
            .get(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if !can_modify(&comment, caller) {
            return Err(AppError::Forbidden);
        }

        self.comments.delete(comment_id).await?;
        Ok(())
    }
}
