//! Memeshelf Services Layer
//!
//! Business services over the repositories, storage and upload validation. The API
//! crate talks to this facade only: it re-exports the storage and processing types
//! handlers need, and keeps ownership, visibility and tag resolution rules out of
//! the HTTP layer.

pub mod services;

pub use memeshelf_processing::{AcceptedUpload, UploadValidator};
#[cfg(feature = "storage-local")]
pub use memeshelf_storage::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use memeshelf_storage::S3Storage;
pub use memeshelf_storage::{
    create_storage, ByteStream, Storage, StorageBackend, StorageError, StorageResult,
};
pub use services::{
    albums::{AlbumChoice, AlbumService},
    comments::CommentService,
    feed::FeedService,
    media::{MediaLifecycleService, UploadRequest},
    tags::TagService,
};
