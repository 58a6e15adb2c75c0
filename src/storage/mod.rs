pub mod memory;
pub mod sqlite;

use crate::model::{SavedSearch, TeeTime};
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Clone)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StorageError {}

impl From<String> for StorageError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for StorageError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(value.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::new(format!("bad stored json: {value}"))
    }
}

/// Durable saved searches and the last results reported for each.
#[async_trait]
pub trait SearchStore: Send + Sync {
    async fn list_searches(&self) -> Result<Vec<SavedSearch>, StorageError>;

    async fn insert_search(&self, search: &SavedSearch) -> Result<(), StorageError>;

    /// Removes the search along with its recorded results.
    async fn delete_search(&self, search_id: Uuid) -> Result<(), StorageError>;

    async fn get_results(&self, search_id: Uuid) -> Result<Vec<TeeTime>, StorageError>;

    /// Appends results. A slot that is already recorded is overwritten.
    async fn put_results(&self, search_id: Uuid, tee_times: &[TeeTime]) -> Result<(), StorageError>;

    /// Removes results by slot identity, ignoring price and capacity.
    async fn drop_results(&self, search_id: Uuid, tee_times: &[TeeTime])
    -> Result<(), StorageError>;
}
