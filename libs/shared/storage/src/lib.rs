pub mod backend;

pub use backend::{FileStorage, MemoryStorage, StorageBackend, StorageError};
