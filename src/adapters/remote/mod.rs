//! Remote store adapters.

mod http_remote_store;
mod in_memory_remote_store;

pub use http_remote_store::{HttpRemoteStore, HttpRemoteStoreConfig};
pub use in_memory_remote_store::{InMemoryRemoteStore, RemoteOperation};
