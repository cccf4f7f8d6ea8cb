pub mod album;
pub mod comment;
#[allow(clippy::module_inception)]
pub mod media;
pub mod tag;

pub use album::{AlbumRepositoryTrait, PostgresAlbumRepository};
pub use comment::{CommentRepositoryTrait, PostgresCommentRepository};
pub use media::{FeedFilter, MediaRepositoryTrait, PostgresMediaRepository};
pub use tag::{PostgresTagRepository, TagRepositoryTrait};
