use crate::{StorageKey, StoreResult};

/// Durable key/value storage for session state.
///
/// Last writer wins. `remove` takes several keys so that logout clears
/// everything in a single write.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: StorageKey) -> StoreResult<Option<String>>;

    fn set(&self, key: StorageKey, value: &str) -> StoreResult<()>;

    fn remove(&self, keys: &[StorageKey]) -> StoreResult<()>;
}
