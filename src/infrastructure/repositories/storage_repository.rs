use async_trait::async_trait;

/// Storage boundary for uploaded file payloads.
///
/// Implementations own the naming scheme: `store` returns an opaque key
/// and only that key is valid for `load` and `delete`. `delete` reports
/// a missing payload as `Ok(false)` so the registry can refuse to drop a
/// database record whose payload is already gone.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Persist the payload; returns the storage key
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String, String>;

    /// Read the payload back
    async fn load(&self, key: &str) -> Result<Vec<u8>, String>;

    /// Remove the payload; Ok(false) when it does not exist
    async fn delete(&self, key: &str) -> Result<bool, String>;
}
