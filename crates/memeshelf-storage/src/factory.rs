#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use memeshelf_core::Config;
use std::sync::Arc;

/// A configuration value the selected backend cannot run without.
#[cfg_attr(
    not(any(feature = "storage-s3", feature = "storage-local")),
    allow(dead_code)
)]
fn required<'a>(value: Option<&'a str>, key: &str) -> StorageResult<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", key)))
}

#[cfg(not(all(feature = "storage-s3", feature = "storage-local")))]
fn backend_disabled(backend: StorageBackend, feature: &str) -> StorageError {
    StorageError::ConfigError(format!(
        "{} storage backend not available ({} feature not enabled)",
        backend, feature
    ))
}

#[cfg(feature = "storage-s3")]
async fn s3_backend(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let bucket = required(config.s3_bucket(), "S3_BUCKET")?;
    let region = required(config.s3_region(), "S3_REGION or AWS_REGION")?;
    let storage = S3Storage::new(
        bucket.to_string(),
        region.to_string(),
        config.s3_endpoint().map(String::from),
    )
    .await?;
    Ok(Arc::new(storage))
}

#[cfg(feature = "storage-local")]
async fn local_backend(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let base_path = required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?;
    let base_url = required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?;
    let storage = LocalStorage::new(base_path, base_url.to_string()).await?;
    Ok(Arc::new(storage))
}

/// Builds the backend `STORAGE_BACKEND` selects.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let backend = config.storage_backend();
    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => s3_backend(config).await,
        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(backend_disabled(backend, "storage-s3")),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => local_backend(config).await,
        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(backend_disabled(backend, "storage-local")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_missing() {
        assert!(matches!(
            required(Some("  "), "S3_BUCKET"),
            Err(StorageError::ConfigError(msg)) if msg == "S3_BUCKET not configured"
        ));
        assert_eq!(required(Some("memes"), "S3_BUCKET").unwrap(), "memes");
        assert!(required(None, "S3_BUCKET").is_err());
    }
}
