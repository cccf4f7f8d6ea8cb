use crate::keys::{candidate_keys, encode_key_for_url, sanitize_filename, validate_key};
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path`, serving files under `base_url`
    /// (e.g. "http://localhost:4000/files").
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path, refusing anything that escapes the root.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);
        if !path.starts_with(&self.base_path) {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Creates the file only if nothing is there yet. `Ok(None)` means the path is taken.
    async fn create_new(&self, path: &Path) -> StorageResult<Option<fs::File>> {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)> {
        let filename = sanitize_filename(filename)?;
        let start = std::time::Instant::now();

        for key in candidate_keys(owner_id, &filename) {
            let path = self.key_to_path(&key)?;
            self.ensure_parent_dir(&path).await?;

            let Some(mut file) = self.create_new(&path).await? else {
                tracing::debug!(key = %key, "Storage key taken, trying alternative name");
                continue;
            };

            file.write_all(&data).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
            })?;

            let url = self.url(&key);
            tracing::info!(
                path = %path.display(),
                key = %key,
                size_bytes = data.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Local storage upload successful"
            );
            return Ok((key, url));
        }

        Err(StorageError::UploadFailed(format!(
            "No free storage name for {}",
            filename
        )))
    }

    fn url(&self, storage_key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_key_for_url(storage_key)
        )
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(storage_key)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let key = storage_key.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Local storage stream download error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:4000/files".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_uses_uploader_scoped_key() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;
        let owner = Uuid::new_v4();

        let (key, url) = storage
            .upload(owner, "cat.png", "image/png", b"png".to_vec())
            .await
            .unwrap();

        assert_eq!(key, format!("memes/user_{}/cat.png", owner));
        assert_eq!(url, format!("http://localhost:4000/files/{}", key));
        assert_eq!(storage.download(&key).await.unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_upload_never_overwrites() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;
        let owner = Uuid::new_v4();

        let (first, _) = storage
            .upload(owner, "cat.png", "image/png", b"one".to_vec())
            .await
            .unwrap();
        let (second, _) = storage
            .upload(owner, "cat.png", "image/png", b"two".to_vec())
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with(".png"));
        assert_eq!(storage.download(&first).await.unwrap(), b"one");
        assert_eq!(storage.download(&second).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .upload(Uuid::new_v4(), "../escape.png", "image/png", vec![1])
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_missing_file() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;
        let (key, _) = storage
            .upload(Uuid::new_v4(), "a.gif", "image/gif", b"GIF89a".to_vec())
            .await
            .unwrap();

        assert!(storage.delete(&key).await.unwrap());
        assert!(!storage.delete(&key).await.unwrap());
        assert!(!storage.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_stream_download() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;
        let data = vec![7u8; 100_000];
        let (key, _) = storage
            .upload(Uuid::new_v4(), "big.webm", "video/webm", data.clone())
            .await
            .unwrap();

        let mut stream = storage.download_stream(&key).await.unwrap();
        let mut downloaded = Vec::new();
        while let Some(chunk) = stream.next().await {
            downloaded.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(data, downloaded);

        assert!(matches!(
            storage.download_stream("memes/none.png").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
