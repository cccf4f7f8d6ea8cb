//! Database repositories for data access layer
//!
//! One repository per entity under media/. Every repository is a trait with a
//! PostgreSQL implementation so services can be exercised without a database.
//
// Entity repositories
pub mod media;
//
// Transaction utilities
pub mod transaction;
//
// In-process implementations
#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use media::{
    AlbumRepositoryTrait, CommentRepositoryTrait, FeedFilter, MediaRepositoryTrait,
    PostgresAlbumRepository, PostgresCommentRepository, PostgresMediaRepository,
    PostgresTagRepository, TagRepositoryTrait,
};
#[cfg(any(test, feature = "memory"))]
pub use memory::InMemoryDatabase;
pub use transaction::TransactionGuard;
