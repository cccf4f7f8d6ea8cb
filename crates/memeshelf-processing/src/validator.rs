use std::io::{Read, Seek};
use std::path::Path;

use memeshelf_core::models::MediaType;
use memeshelf_core::RejectionReason;

use crate::signature::{read_header, signature_matches, HEADER_LEN};

pub const ALLOWED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "mp4", "webm"];

pub const ALLOWED_CONTENT_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
];

/// An upload that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    /// Lower-case, without the dot
    pub extension: String,
    /// Declared content type, exactly as whitelisted
    pub content_type: String,
    pub media_type: MediaType,
}

/// Upload acceptance pipeline.
///
/// Runs extension whitelist, declared MIME whitelist and magic-byte check in that
/// order, stopping at the first failure.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(
            ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl UploadValidator {
    pub fn new(allowed_extensions: Vec<String>, allowed_content_types: Vec<String>) -> Self {
        Self {
            allowed_extensions,
            allowed_content_types,
        }
    }

    fn extension_of(filename: &str) -> Option<String> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    pub fn check_extension(&self, filename: &str) -> Result<String, RejectionReason> {
        Self::extension_of(filename)
            .filter(|ext| self.allowed_extensions.contains(ext))
            .ok_or(RejectionReason::ExtensionNotAllowed)
    }

    /// Exact membership: no case folding, no parameters.
    pub fn check_content_type(&self, declared: &str) -> Result<String, RejectionReason> {
        self.allowed_content_types
            .iter()
            .find(|allowed| allowed.as_str() == declared)
            .cloned()
            .ok_or(RejectionReason::MimeNotAllowed)
    }

    /// Checks an upload held in memory. Only the first [`HEADER_LEN`] bytes are inspected.
    pub fn check(
        &self,
        filename: &str,
        declared_content_type: &str,
        data: &[u8],
    ) -> Result<AcceptedUpload, RejectionReason> {
        let header = &data[..data.len().min(HEADER_LEN)];
        self.check_with_header(filename, declared_content_type, || Ok(header.to_vec()))
    }

    /// Checks an upload behind a seekable reader, leaving the reader where it was.
    pub fn check_reader<R: Read + Seek>(
        &self,
        filename: &str,
        declared_content_type: &str,
        reader: &mut R,
    ) -> Result<AcceptedUpload, RejectionReason> {
        self.check_with_header(filename, declared_content_type, || read_header(reader))
    }

    fn check_with_header<F>(
        &self,
        filename: &str,
        declared_content_type: &str,
        header: F,
    ) -> Result<AcceptedUpload, RejectionReason>
    where
        F: FnOnce() -> std::io::Result<Vec<u8>>,
    {
        let extension = self.check_extension(filename)?;
        let content_type = self.check_content_type(declared_content_type)?;

        // An unreadable file cannot prove its signature.
        let header = header().unwrap_or_default();
        if !signature_matches(&header, &extension) {
            tracing::debug!(
                filename = %filename,
                extension = %extension,
                declared_content_type = %declared_content_type,
                "Upload signature does not match extension"
            );
            return Err(RejectionReason::SignatureMismatch);
        }

        let media_type = MediaType::from_content_type(&content_type);
        Ok(AcceptedUpload {
            extension,
            content_type,
            media_type,
        })
    }
}
