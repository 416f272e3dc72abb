//! In-memory Local Store for tests and ephemeral sessions.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::ports::{LocalStore, PersistenceError};

#[derive(Debug, Default)]
pub struct InMemoryLocalStore {
    lists: RwLock<HashMap<String, Vec<Value>>>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current contents of `key`.
    pub async fn list(&self, key: &str) -> Vec<Value> {
        self.lists.read().await.get(key).cloned().unwrap_or_default()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.lists.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Local("local store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn load_list(&self, key: &str) -> Result<Vec<Value>, PersistenceError> {
        self.check()?;
        Ok(self.list(key).await)
    }

    async fn save_list(&self, key: &str, items: &[Value]) -> Result<(), PersistenceError> {
        self.check()?;
        self.lists.write().await.insert(key.to_string(), items.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn round_trips_lists() {
        let store = InMemoryLocalStore::new();
        store.save_list("a", &[json!(1)]).await.unwrap();
        assert_eq!(store.load_list("a").await.unwrap(), vec![json!(1)]);
        assert!(store.load_list("b").await.unwrap().is_empty());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn failure_injection() {
        let store = InMemoryLocalStore::new();
        store.set_failing(true);
        assert!(store.save_list("a", &[]).await.is_err());
        store.set_failing(false);
        assert!(store.save_list("a", &[]).await.is_ok());
    }
}
