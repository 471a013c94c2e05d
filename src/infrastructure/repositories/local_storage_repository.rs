use super::storage_repository::StorageRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Local-disk storage. Keys are file names of the form
/// `<millis>_<sanitized original name>` inside the uploads directory;
/// the timestamp prefix keeps re-uploads of the same name from colliding.
pub struct LocalStorageRepository {
    uploads_dir: PathBuf,
}

impl LocalStorageRepository {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, String> {
        // Keys never contain path separators; reject anything that tries
        // to escape the uploads directory.
        if key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(format!("invalid storage key: {}", key));
        }
        Ok(self.uploads_dir.join(key))
    }

    fn sanitize(name: &str) -> String {
        name.chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' => c,
                _ => '_',
            })
            .collect()
    }
}

#[async_trait]
impl StorageRepository for LocalStorageRepository {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String, String> {
        tokio::fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| format!("failed to create uploads dir: {}", e))?;

        let key = format!("{}_{}", Utc::now().timestamp_millis(), Self::sanitize(name));
        let path = self.path_for(&key)?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;

        Ok(key)
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, String> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        let path = self.path_for(key)?;
        if !Path::new(&path).exists() {
            return Ok(false);
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| format!("failed to delete {}: {}", path.display(), e))?;
        Ok(true)
    }
}
