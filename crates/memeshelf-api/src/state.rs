//! Application state shared by all handlers.

use memeshelf_core::SiteConfig;
use memeshelf_services::{
    AlbumService, CommentService, FeedService, MediaLifecycleService, Storage, TagService,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub media: MediaLifecycleService,
    pub tags: TagService,
    pub albums: AlbumService,
    pub comments: CommentService,
    pub feed: FeedService,
    pub storage: Arc<dyn Storage>,
    pub site: SiteConfig,
    /// Present when running against PostgreSQL; the health check pings it.
    pub db_pool: Option<PgPool>,
}
