//! Memeshelf Processing Library
//!
//! Decides whether an uploaded file may be stored: extension and declared MIME
//! whitelists, then a magic-byte check of the actual content.

pub mod signature;
pub mod validator;

pub use signature::{read_header, signature_matches, HEADER_LEN};
pub use validator::{AcceptedUpload, UploadValidator};
