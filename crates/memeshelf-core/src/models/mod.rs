//! Data models for the application
//!
//! Each sub-module holds one domain entity together with its request DTOs.

mod album;
mod comment;
mod media;
mod tag;

pub use album::*;
pub use comment::*;
pub use media::*;
pub use tag::*;
