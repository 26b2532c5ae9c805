use crate::error::ClientResult;

/// Synchronous string key/value storage (browser `localStorage` in production).
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;
}

#[cfg(test)]
pub use mock::MemoryStorage;
