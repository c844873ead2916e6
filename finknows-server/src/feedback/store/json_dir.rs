//! JSON-directory feedback store
//!
//! Layout inside the data folder:
//! - `feedback_<id>.json`: one pretty-printed file per event. It is written
//!   to a hidden staging file first and then hard-linked into place, so an
//!   existing record is never replaced and a failed write leaves nothing
//!   under the final name
//! - `statistics.json`: the aggregate document, replaced atomically via a
//!   temporary file and rename

use async_trait::async_trait;
use finknows_common::uuid_utils;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{EventStore, StatisticsStore, StoreError};
use crate::feedback::model::{FeedbackEvent, FeedbackId};
use crate::feedback::statistics::FeedbackStatistics;

const EVENT_FILE_PREFIX: &str = "feedback_";
const EVENT_FILE_SUFFIX: &str = ".json";
pub const STATISTICS_FILE_NAME: &str = "statistics.json";
const STATISTICS_TEMP_FILE_NAME: &str = "statistics.json.tmp";
const STAGING_SUFFIX: &str = ".tmp";

pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub async fn open(dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn event_path(&self, id: &FeedbackId) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", EVENT_FILE_PREFIX, id, EVENT_FILE_SUFFIX))
    }

    pub fn statistics_path(&self) -> PathBuf {
        self.dir.join(STATISTICS_FILE_NAME)
    }

    /// Private per-write file, hidden from `list`
    fn staging_path(&self, id: &FeedbackId) -> PathBuf {
        self.dir.join(format!(
            ".{}{}.{}{}",
            EVENT_FILE_PREFIX,
            id,
            uuid_utils::short_id(),
            STAGING_SUFFIX
        ))
    }

    async fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(body).await?;
        file.sync_data().await
    }

    fn is_event_file(name: &str) -> bool {
        name.starts_with(EVENT_FILE_PREFIX) && name.ends_with(EVENT_FILE_SUFFIX)
    }

    async fn read_event(path: &Path) -> Result<FeedbackEvent, StoreError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl EventStore for JsonDirStore {
    async fn append(&self, event: &FeedbackEvent) -> Result<(), StoreError> {
        let path = self.event_path(&event.id);
        let body = serde_json::to_vec_pretty(event)?;

        // The record only becomes visible once it is completely on disk
        let staging = self.staging_path(&event.id);
        let published = match Self::write_synced(&staging, &body).await {
            Ok(()) => tokio::fs::hard_link(&staging, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = tokio::fs::remove_file(&staging).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove staging file {}: {}", staging.display(), e);
            }
        }

        match published {
            Ok(()) => {
                debug!("Feedback saved to {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::DuplicateId(event.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &FeedbackId) -> Result<Option<FeedbackEvent>, StoreError> {
        match Self::read_event(&self.event_path(id)).await {
            Ok(event) => Ok(Some(event)),
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self) -> Result<Vec<FeedbackEvent>, StoreError> {
        let mut events = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !Self::is_event_file(name) {
                continue;
            }

            match Self::read_event(&entry.path()).await {
                Ok(event) => events.push(event),
                Err(e) => warn!("Skipping unreadable feedback file {}: {}", name, e),
            }
        }

        events.sort_by(|a, b| a.received_at.cmp(&b.received_at).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[async_trait]
impl StatisticsStore for JsonDirStore {
    async fn load(&self) -> Result<FeedbackStatistics, StoreError> {
        let path = self.statistics_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No statistics file yet, starting from zero");
                return Ok(FeedbackStatistics::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<FeedbackStatistics>(&bytes) {
            Ok(stats) => Ok(stats.normalized()),
            Err(e) => {
                warn!(
                    "Corrupt statistics file {} ({}), starting from zero",
                    path.display(),
                    e
                );
                Ok(FeedbackStatistics::default())
            }
        }
    }

    async fn save(&self, statistics: &FeedbackStatistics) -> Result<(), StoreError> {
        let temp_path = self.dir.join(STATISTICS_TEMP_FILE_NAME);
        let body = serde_json::to_vec_pretty(statistics)?;

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(&body).await?;
        file.sync_data().await?;
        drop(file);

        tokio::fs::rename(&temp_path, self.statistics_path()).await?;
        Ok(())
    }
}
