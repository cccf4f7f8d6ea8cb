pub mod albums;
pub mod comments;
pub mod feed;
pub mod media;
pub mod site;
pub mod tags;
