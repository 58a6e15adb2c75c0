use super::{SearchStore, StorageError};
use crate::model::{SavedSearch, TeeTime};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    searches: RwLock<Vec<SavedSearch>>,
    results: RwLock<HashMap<Uuid, Vec<TeeTime>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchStore for MemoryStore {
    async fn list_searches(&self) -> Result<Vec<SavedSearch>, StorageError> {
        Ok(self.searches.read().await.clone())
    }

    async fn insert_search(&self, search: &SavedSearch) -> Result<(), StorageError> {
        let mut searches = self.searches.write().await;
        if searches.iter().any(|s| s.id == search.id) {
            return Err(StorageError::new(format!("search {} already exists", search.id)));
        }
        searches.push(search.clone());
        Ok(())
    }

    async fn delete_search(&self, search_id: Uuid) -> Result<(), StorageError> {
        self.searches.write().await.retain(|s| s.id != search_id);
        self.results.write().await.remove(&search_id);
        Ok(())
    }

    async fn get_results(&self, search_id: Uuid) -> Result<Vec<TeeTime>, StorageError> {
        Ok(self
            .results
            .read()
            .await
            .get(&search_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_results(&self, search_id: Uuid, tee_times: &[TeeTime]) -> Result<(), StorageError> {
        let mut results = self.results.write().await;
        let stored = results.entry(search_id).or_default();
        for tee_time in tee_times {
            match stored.iter_mut().find(|t| **t == *tee_time) {
                Some(existing) => *existing = tee_time.clone(),
                None => stored.push(tee_time.clone()),
            }
        }
        Ok(())
    }

    async fn drop_results(
        &self,
        search_id: Uuid,
        tee_times: &[TeeTime],
    ) -> Result<(), StorageError> {
        if let Some(stored) = self.results.write().await.get_mut(&search_id) {
            stored.retain(|t| !tee_times.contains(t));
        }
        Ok(())
    }
}
