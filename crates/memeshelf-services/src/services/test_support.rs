use memeshelf_core::Caller;
use memeshelf_db::InMemoryDatabase;
use memeshelf_processing::UploadValidator;
use memeshelf_storage::{LocalStorage, Storage};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use super::albums::AlbumService;
use super::comments::CommentService;
use super::feed::FeedService;
use super::media::{MediaLifecycleService, UploadRequest};
use super::tags::TagService;

pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

pub struct Fixture {
    pub db: InMemoryDatabase,
    pub storage: Arc<LocalStorage>,
    pub tags: TagService,
    pub media: MediaLifecycleService,
    pub albums: AlbumService,
    pub comments: CommentService,
    pub feed: FeedService,
    _dir: TempDir,
}

pub async fn fixture() -> Fixture {
    fixture_with_page_size(24).await
}

pub async fn fixture_with_page_size(page_size: u32) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(
        LocalStorage::new(dir.path(), "http://localhost:4000/files".to_string())
            .await
            .unwrap(),
    );
    let db = InMemoryDatabase::new();
    let repo = Arc::new(db.clone());
    let tags = TagService::new(repo.clone());
    let dyn_storage: Arc<dyn Storage> = storage.clone();

    Fixture {
        media: MediaLifecycleService::new(
            repo.clone(),
            tags.clone(),
            dyn_storage,
            UploadValidator::default(),
        ),
        albums: AlbumService::new(repo.clone()),
        comments: CommentService::new(repo.clone(), repo.clone(), page_size),
        feed: FeedService::new(repo.clone(), tags.clone(), page_size),
        tags,
        db,
        storage,
        _dir: dir,
    }
}

pub fn user() -> Caller {
    Caller::new(Uuid::new_v4())
}

pub fn png_upload(filename: &str, tags: &str) -> UploadRequest {
    UploadRequest {
        filename: filename.to_string(),
        content_type: "image/png".to_string(),
        data: PNG.to_vec(),
        title: String::new(),
        tags: tags.to_string(),
        album: None,
    }
}
