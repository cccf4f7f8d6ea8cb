//! Test helpers: build AppState over the in-memory repositories and serve the router.
//!
//! Run from workspace root: `cargo test -p memeshelf-api`.

use axum::http::{HeaderName, HeaderValue};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestRequest, TestServer};
use memeshelf_api::auth::{ELEVATED_HEADER, USER_ID_HEADER};
use memeshelf_api::constants;
use memeshelf_api::setup::routes;
use memeshelf_api::state::AppState;
use memeshelf_core::SiteConfig;
use memeshelf_db::InMemoryDatabase;
use memeshelf_services::{
    AlbumService, CommentService, FeedService, LocalStorage, MediaLifecycleService, Storage,
    TagService, UploadValidator,
};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// API path prefix for tests (e.g. `/api/v0/feed`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_page_size(24).await
}

pub async fn setup_test_app_with_page_size(page_size: u32) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(temp_dir.path(), "http://localhost:4000/files".to_string())
            .await
            .expect("Failed to create local storage"),
    );

    let repo = Arc::new(InMemoryDatabase::new());
    let tags = TagService::new(repo.clone());

    let state = Arc::new(AppState {
        media: MediaLifecycleService::new(
            repo.clone(),
            tags.clone(),
            storage.clone(),
            UploadValidator::default(),
        ),
        albums: AlbumService::new(repo.clone()),
        comments: CommentService::new(repo.clone(), repo.clone(), page_size),
        feed: FeedService::new(repo.clone(), tags.clone(), page_size),
        tags,
        storage,
        site: SiteConfig::default(),
        db_pool: None,
    });

    let router = routes::build_router(state, MAX_UPLOAD_BYTES);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        _temp_dir: temp_dir,
    }
}

/// Caller identity headers on a test request.
pub trait AsCaller {
    fn as_user(self, user_id: Uuid) -> Self;
    fn as_elevated(self, user_id: Uuid) -> Self;
}

impl AsCaller for TestRequest {
    fn as_user(self, user_id: Uuid) -> Self {
        self.add_header(
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_str(&user_id.to_string()).expect("uuid is a valid header value"),
        )
    }

    fn as_elevated(self, user_id: Uuid) -> Self {
        self.as_user(user_id).add_header(
            HeaderName::from_static(ELEVATED_HEADER),
            HeaderValue::from_static("true"),
        )
    }
}

pub fn png_form(filename: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(PNG.to_vec())
            .file_name(filename)
            .mime_type("image/png"),
    )
}

/// Uploads a PNG as `user_id` and returns the created media JSON.
pub async fn upload_png(app: &TestApp, user_id: Uuid, tags: &str) -> serde_json::Value {
    let response = app
        .client()
        .post(&api_path("/media"))
        .as_user(user_id)
        .multipart(png_form("meme.png").add_text("tags", tags.to_string()))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}

pub fn media_id(media: &serde_json::Value) -> Uuid {
    media["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("media id")
}
