use memeshelf_core::models::{FeedOrder, FeedPage, Tag};
use memeshelf_core::{AppError, Caller, PageWindow};
use memeshelf_db::{FeedFilter, MediaRepositoryTrait};
use std::sync::Arc;

use super::tags::TagService;

/// Paginated listings of public media, optionally narrowed to one tag.
#[derive(Clone)]
pub struct FeedService {
    media: Arc<dyn MediaRepositoryTrait>,
    tags: TagService,
    page_size: u32,
}

impl FeedService {
    pub fn new(media: Arc<dyn MediaRepositoryTrait>, tags: TagService, page_size: u32) -> Self {
        Self {
            media,
            tags,
            page_size,
        }
    }

    async fn lookup_tag(&self, slug: Option<&str>) -> Result<Option<Option<Tag>>, AppError> {
        match slug.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(slug) => Ok(Some(self.tags.find_by_slug(slug).await?)),
        }
    }

    /// Newest first. An unknown tag slug gives an empty page.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn latest(
        &self,
        caller: &Caller,
        tag_slug: Option<&str>,
        page: Option<&str>,
    ) -> Result<FeedPage, AppError> {
        let tag = match self.lookup_tag(tag_slug).await? {
            Some(None) => return Ok(self.empty_page()),
            Some(Some(tag)) => Some(tag),
            None => None,
        };
        self.page(caller, tag, page, FeedOrder::Newest).await
    }

    /// Random order. An unknown tag slug is NotFound.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn random(
        &self,
        caller: &Caller,
        tag_slug: Option<&str>,
        page: Option<&str>,
    ) -> Result<FeedPage, AppError> {
        let tag = match self.lookup_tag(tag_slug).await? {
            Some(None) => return Err(AppError::NotFound("Tag not found".to_string())),
            Some(Some(tag)) => Some(tag),
            None => None,
        };
        self.page(caller, tag, page, FeedOrder::Random).await
    }

    async fn page(
        &self,
        caller: &Caller,
        tag: Option<Tag>,
        page: Option<&str>,
        order: FeedOrder,
    ) -> Result<FeedPage, AppError> {
        let filter = FeedFilter {
            tag_id: tag.as_ref().map(|t| t.id),
            viewer: *caller,
        };
        let total = self.media.count_feed(&filter).await?;
        let window = PageWindow::resolve(page, total, self.page_size);
        let items = self
            .media
            .list_feed(&filter, order, window.limit(), window.offset())
            .await?;

        Ok(FeedPage {
            items,
            page: window.page,
            num_pages: window.num_pages,
            total,
            has_next: window.has_next(),
            next_page_number: window.next_page_number(),
            current_tag: tag,
        })
    }

    fn empty_page(&self) -> FeedPage {
        let window = PageWindow::resolve(None, 0, self.page_size);
        FeedPage {
            items: Vec::new(),
            page: window.page,
            num_pages: window.num_pages,
            total: 0,
            has_next: false,
            next_page_number: None,
            current_tag: None,
        }
    }
}
