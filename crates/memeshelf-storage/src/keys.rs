//! Shared key generation for storage backends.
//!
//! Key format: `memes/user_{uploader_id}/{filename}`.

use rand::distr::{Alphanumeric, SampleString};
use uuid::Uuid;

use crate::{StorageError, StorageResult};

const MAX_FILENAME_BYTES: usize = 255;
const COLLISION_SUFFIX_LEN: usize = 7;

/// Number of alternative names a backend tries before giving up on a taken key.
pub const MAX_NAME_ATTEMPTS: usize = 10;

pub fn generate_storage_key(owner_id: Uuid, filename: &str) -> String {
    format!("memes/user_{}/{}", owner_id, filename)
}

/// Reduces a client-supplied filename to a safe final path component.
pub fn sanitize_filename(raw: &str) -> StorageResult<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." {
        return Err(StorageError::InvalidKey("Filename is empty".to_string()));
    }
    if name.contains("..") {
        return Err(StorageError::InvalidKey(
            "Filename must not contain '..'".to_string(),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(StorageError::InvalidKey(
            "Filename contains control characters".to_string(),
        ));
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(StorageError::InvalidKey(format!(
            "Filename exceeds {} bytes",
            MAX_FILENAME_BYTES
        )));
    }
    Ok(name.to_string())
}

/// `cat.png` -> `cat_Ab3dE9x.png`; names without an extension just get the suffix.
pub fn alternative_filename(filename: &str) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), COLLISION_SUFFIX_LEN);
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", filename, suffix),
    }
}

/// Candidate keys for an upload, in the order a backend should try them.
pub fn candidate_keys(owner_id: Uuid, filename: &str) -> impl Iterator<Item = String> + '_ {
    (0..MAX_NAME_ATTEMPTS).map(move |attempt| {
        if attempt == 0 {
            generate_storage_key(owner_id, filename)
        } else {
            generate_storage_key(owner_id, &alternative_filename(filename))
        }
    })
}

/// Rejects keys that could escape the storage root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Percent-encodes each path segment of a key for use in a URL.
pub fn encode_key_for_url(storage_key: &str) -> String {
    storage_key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
