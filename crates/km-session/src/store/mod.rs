pub(crate) mod error;
pub(crate) mod file_store;
pub(crate) mod memory_store;
pub(crate) mod session_store;
pub(crate) mod storage_key;

pub use error::{Result as StoreResult, StoreError};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use session_store::SessionStore;
pub use storage_key::StorageKey;
