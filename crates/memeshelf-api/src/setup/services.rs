//! Service and repository wiring

use memeshelf_core::Config;
use memeshelf_db::{
    PostgresAlbumRepository, PostgresCommentRepository, PostgresMediaRepository,
    PostgresTagRepository,
};
use memeshelf_services::{
    AlbumService, CommentService, FeedService, MediaLifecycleService, Storage, TagService,
    UploadValidator,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::AppState;

/// Build the PostgreSQL-backed application state.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let media_repository = Arc::new(PostgresMediaRepository::new(pool.clone()));
    let tags = TagService::new(Arc::new(PostgresTagRepository::new(pool.clone())));

    Arc::new(AppState {
        media: MediaLifecycleService::new(
            media_repository.clone(),
            tags.clone(),
            storage.clone(),
            UploadValidator::default(),
        ),
        albums: AlbumService::new(Arc::new(PostgresAlbumRepository::new(pool.clone()))),
        comments: CommentService::new(
            Arc::new(PostgresCommentRepository::new(pool.clone())),
            media_repository.clone(),
            config.comments_page_size(),
        ),
        feed: FeedService::new(media_repository, tags.clone(), config.feed_page_size()),
        tags,
        storage,
        site: config.site().clone(),
        db_pool: Some(pool),
    })
}
