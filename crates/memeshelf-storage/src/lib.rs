//! Memeshelf Storage Library
//!
//! Storage abstraction for uploaded memes, with local filesystem and S3 backends.
//!
//! # Storage key format
//!
//! Every backend stores an upload under `memes/user_{uploader_id}/{filename}`. When that
//! key is already taken the backend picks `{stem}_{7 random alphanumerics}.{ext}` in the
//! same directory instead of overwriting. Keys never contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memeshelf_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
