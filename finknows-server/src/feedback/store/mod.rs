//! Feedback persistence
//!
//! Two seams: an append-only [`EventStore`] holding one record per feedback
//! event, and a [`StatisticsStore`] holding the single aggregate document.
//! Appends never overwrite; a colliding id is reported as
//! [`StoreError::DuplicateId`] so the caller can pick a new one.
//!
//! A missing or unreadable aggregate document loads as zeroed statistics.

pub mod json_dir;
pub mod memory;
pub mod sqlite;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use finknows_common::config::StorageBackend;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::model::{FeedbackEvent, FeedbackId};
use super::statistics::FeedbackStatistics;

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// An event with this id already exists
    #[error("Feedback id already exists: {0}")]
    DuplicateId(FeedbackId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored record could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Append-only store of individual feedback events
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event; fails with `DuplicateId` instead of overwriting
    async fn append(&self, event: &FeedbackEvent) -> Result<(), StoreError>;

    async fn get(&self, id: &FeedbackId) -> Result<Option<FeedbackEvent>, StoreError>;

    /// All events ordered by receive time, then id
    async fn list(&self) -> Result<Vec<FeedbackEvent>, StoreError>;
}

/// Holder of the single aggregate statistics document
///
/// Implementations do not serialize read-modify-write cycles themselves;
/// that is the job of [`crate::feedback::FeedbackAggregator`].
#[async_trait]
pub trait StatisticsStore: Send + Sync {
    async fn load(&self) -> Result<FeedbackStatistics, StoreError>;

    async fn save(&self, statistics: &FeedbackStatistics) -> Result<(), StoreError>;
}

/// Event and statistics stores used by one service instance
#[derive(Clone)]
pub struct FeedbackStores {
    pub events: Arc<dyn EventStore>,
    pub statistics: Arc<dyn StatisticsStore>,
}

impl FeedbackStores {
    /// Use one backend for both roles
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: EventStore + StatisticsStore + 'static,
    {
        Self {
            events: store.clone(),
            statistics: store,
        }
    }

    /// Fresh in-memory stores
    pub fn in_memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }
}

/// SQLite database file name inside the data folder
pub const SQLITE_FILE_NAME: &str = "feedback.db";

/// Open the configured backend rooted at `data_dir`
pub async fn open_stores(
    backend: StorageBackend,
    data_dir: &Path,
) -> Result<FeedbackStores, StoreError> {
    let stores = match backend {
        StorageBackend::Json => FeedbackStores::shared(Arc::new(JsonDirStore::open(data_dir).await?)),
        StorageBackend::Sqlite => {
            let db_path = data_dir.join(SQLITE_FILE_NAME);
            FeedbackStores::shared(Arc::new(SqliteStore::open(&db_path).await?))
        }
        StorageBackend::Memory => FeedbackStores::in_memory(),
    };
    info!("Feedback storage backend: {} ({})", backend, data_dir.display());
    Ok(stores)
}
