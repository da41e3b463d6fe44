use crate::traits::{AssetStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalAssetStore {
    /// Create a new LocalAssetStore instance
    ///
    /// # Arguments
    /// * `root` - Content root directory (e.g., "static/uploads/thanks")
    /// * `public_prefix` - Path prefix used in public views (e.g., "/img/thanks")
    pub async fn new(root: impl Into<PathBuf>, public_prefix: String) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalAssetStore {
            root,
            public_prefix,
        })
    }

    /// Convert a stored name to a filesystem path with security validation.
    ///
    /// Names are expected to be sanitized already; this re-checks that no
    /// path component can escape the content root.
    fn name_to_path(&self, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(StorageError::InvalidName(
                "Storage name contains invalid characters".to_string(),
            ));
        }

        let path = self.root.join(filename);
        debug_assert!(path.starts_with(&self.root));
        Ok(path)
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, filename: &str, data: Vec<u8>) -> StorageResult<String> {
        let path = self.name_to_path(filename)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(filename.to_string())
    }

    async fn delete(&self, filename: &str) -> StorageResult<()> {
        let path = self.name_to_path(filename)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Local storage delete successful");

        Ok(())
    }

    async fn exists(&self, filename: &str) -> StorageResult<bool> {
        let path = self.name_to_path(filename)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_path(&self, filename: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_store(dir: &tempfile::TempDir) -> LocalAssetStore {
        LocalAssetStore::new(dir.path(), "/img/thanks".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_writes_bytes_under_root() {
        let dir = tempdir().unwrap();
        let storage = test_store(&dir).await;

        let name = storage.store("a.png", b"png bytes".to_vec()).await.unwrap();
        assert_eq!(name, "a.png");
        assert!(storage.exists("a.png").await.unwrap());

        let on_disk = std::fs::read(dir.path().join("a.png")).unwrap();
        assert_eq!(on_disk, b"png bytes");
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_name() {
        let dir = tempdir().unwrap();
        let storage = test_store(&dir).await;

        storage.store("a.png", b"first".to_vec()).await.unwrap();
        storage.store("a.png", b"second".to_vec()).await.unwrap();

        let on_disk = std::fs::read(dir.path().join("a.png")).unwrap();
        assert_eq!(on_disk, b"second");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = test_store(&dir).await;

        let result = storage.store("../escape.png", b"x".to_vec()).await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));

        let result = storage.delete("../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));

        let result = storage.exists("a/b.png").await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));

        let result = storage.exists("").await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let storage = test_store(&dir).await;

        assert!(storage.delete("nonexistent.png").await.is_ok());
    }

    #[tokio::test]
    async fn test_public_path_projection() {
        let dir = tempdir().unwrap();
        let storage = test_store(&dir).await;
        assert_eq!(storage.public_path("a.png"), "/img/thanks/a.png");

        let storage = LocalAssetStore::new(dir.path(), "/img/thanks/".to_string())
            .await
            .unwrap();
        assert_eq!(storage.public_path("a.png"), "/img/thanks/a.png");
    }
}
