pub mod albums;
pub mod comments;
pub mod feed;
pub mod media;
pub mod tags;

#[cfg(test)]
pub(crate) mod test_support;
