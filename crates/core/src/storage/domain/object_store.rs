use crate::storage::domain::store_error::StoreError;

/// Flat key/value blob storage holding uploads, frames and results.
pub trait ObjectStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    fn put(&self, key: &str, body: &[u8]) -> Result<(), StoreError>;
}
