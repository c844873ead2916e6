//! SQLite feedback store
//!
//! `feedback_events` holds one row per event and is only ever inserted into.
//! `feedback_statistics` holds a single row whose `document` column is the
//! aggregate serialized as JSON, matching the layout of `statistics.json`.

use async_trait::async_trait;
use chrono::SecondsFormat;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::{EventStore, StatisticsStore, StoreError};
use crate::feedback::model::{FeedbackEvent, FeedbackId, UserJudgment};
use crate::feedback::statistics::FeedbackStatistics;

const MAX_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT_MS: u64 = 5000;
const STATISTICS_ROW_ID: i64 = 1;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let newly_created = !db_path.exists();
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        if newly_created {
            info!("Initialized new feedback database: {}", db_path.display());
        } else {
            info!("Opened existing feedback database: {}", db_path.display());
        }

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the tables if needed
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        create_events_table(&pool).await?;
        create_statistics_table(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn create_events_table(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback_events (
            id TEXT PRIMARY KEY NOT NULL,
            text TEXT NOT NULL,
            predicted_sentiment TEXT NOT NULL,
            user_feedback TEXT NOT NULL,
            predicted_confidence REAL,
            timestamp TEXT NOT NULL,
            received_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_feedback_events_received ON feedback_events(received_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_statistics_table(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback_statistics (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            document TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn format_time(time: &chrono::DateTime<chrono::Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn event_from_row(row: &SqliteRow) -> Result<FeedbackEvent, StoreError> {
    let id: String = row.try_get("id")?;
    let judgment: String = row.try_get("user_feedback")?;
    let timestamp: String = row.try_get("timestamp")?;
    let received_at: String = row.try_get("received_at")?;

    let user_feedback = UserJudgment::parse(&judgment)
        .ok_or_else(|| StoreError::Corrupt(format!("event {}: bad judgment '{}'", id, judgment)))?;
    let timestamp = finknows_common::time::parse_rfc3339(&timestamp)
        .map_err(|e| StoreError::Corrupt(format!("event {}: {}", id, e)))?;
    let received_at = finknows_common::time::parse_rfc3339(&received_at)
        .map_err(|e| StoreError::Corrupt(format!("event {}: {}", id, e)))?;

    Ok(FeedbackEvent {
        id: FeedbackId::new(id),
        text: row.try_get("text")?,
        predicted_sentiment: row.try_get("predicted_sentiment")?,
        user_feedback,
        predicted_confidence: row.try_get("predicted_confidence")?,
        timestamp,
        received_at,
    })
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn append(&self, event: &FeedbackEvent) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO feedback_events
                (id, text, predicted_sentiment, user_feedback, predicted_confidence, timestamp, received_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.as_str())
        .bind(&event.text)
        .bind(&event.predicted_sentiment)
        .bind(event.user_feedback.as_str())
        .bind(event.predicted_confidence)
        .bind(format_time(&event.timestamp))
        .bind(format_time(&event.received_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateId(event.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &FeedbackId) -> Result<Option<FeedbackEvent>, StoreError> {
        let row = sqlx::query("SELECT * FROM feedback_events WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<FeedbackEvent>, StoreError> {
        let rows = sqlx::query("SELECT * FROM feedback_events")
            .fetch_all(&self.pool)
            .await?;

        let mut events = rows
            .iter()
            .map(event_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        // Stored times are text; order on the parsed values
        events.sort_by(|a, b| a.received_at.cmp(&b.received_at).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[async_trait]
impl StatisticsStore for SqliteStore {
    async fn load(&self) -> Result<FeedbackStatistics, StoreError> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM feedback_statistics WHERE id = ?")
                .bind(STATISTICS_ROW_ID)
                .fetch_optional(&self.pool)
                .await?;

        let Some(document) = document else {
            return Ok(FeedbackStatistics::default());
        };

        match serde_json::from_str::<FeedbackStatistics>(&document) {
            Ok(stats) => Ok(stats.normalized()),
            Err(e) => {
                warn!("Corrupt statistics document ({}), starting from zero", e);
                Ok(FeedbackStatistics::default())
            }
        }
    }

    async fn save(&self, statistics: &FeedbackStatistics) -> Result<(), StoreError> {
        let document = serde_json::to_string(statistics)?;

        sqlx::query(
            r#"
            INSERT INTO feedback_statistics (id, document, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(STATISTICS_ROW_ID)
        .bind(document)
        .bind(format_time(&finknows_common::time::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
