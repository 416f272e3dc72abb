//! Local Store Port - device-local lists of JSON records.
//!
//! Each key holds one JSON array. Callers load the whole list, append, and
//! save the whole list back; there is no partial update.

use async_trait::async_trait;
use serde_json::Value;

use super::persistence_tier::PersistenceError;

#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Load the list stored under `key`. A missing key is an empty list.
    async fn load_list(&self, key: &str) -> Result<Vec<Value>, PersistenceError>;

    /// Replace the list stored under `key`.
    async fn save_list(&self, key: &str, items: &[Value]) -> Result<(), PersistenceError>;
}
