//! In-memory feedback store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{EventStore, StatisticsStore, StoreError};
use crate::feedback::model::{FeedbackEvent, FeedbackId};
use crate::feedback::statistics::FeedbackStatistics;

/// Lock-guarded maps; contents are lost when the process exits
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<FeedbackId, FeedbackEvent>>,
    statistics: RwLock<FeedbackStatistics>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append(&self, event: &FeedbackEvent) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(StoreError::DuplicateId(event.id.clone()));
        }
        events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn get(&self, id: &FeedbackId) -> Result<Option<FeedbackEvent>, StoreError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<FeedbackEvent>, StoreError> {
        let mut events: Vec<FeedbackEvent> = self.events.read().await.values().cloned().collect();
        events.sort_by(|a, b| a.received_at.cmp(&b.received_at).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[async_trait]
impl StatisticsStore for MemoryStore {
    async fn load(&self) -> Result<FeedbackStatistics, StoreError> {
        Ok(self.statistics.read().await.clone())
    }

    async fn save(&self, statistics: &FeedbackStatistics) -> Result<(), StoreError> {
        *self.statistics.write().await = statistics.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::model::UserJudgment;
    use chrono::{Duration, Utc};

    fn event(id: &str, offset_secs: i64) -> FeedbackEvent {
        let now = Utc::now();
        FeedbackEvent {
            id: FeedbackId::new(id),
            text: "Revenue beat estimates".to_string(),
            predicted_sentiment: "LABEL_2".to_string(),
            user_feedback: UserJudgment::Accurate,
            predicted_confidence: Some(0.9),
            timestamp: now,
            received_at: now + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn test_append_and_get() {
        let store = MemoryStore::new();
        let e = event("aaaa0001", 0);
        store.append(&e).await.unwrap();

        let fetched = store.get(&e.id).await.unwrap();
        assert_eq!(fetched, Some(e));
        assert_eq!(store.get(&FeedbackId::new("missing0")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_append_never_overwrites() {
        let store = MemoryStore::new();
        let first = event("aaaa0001", 0);
        store.append(&first).await.unwrap();

        let mut second = event("aaaa0001", 5);
        second.text = "Different text".to_string();
        let err = store.append(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));

        assert_eq!(store.get(&first.id).await.unwrap().unwrap().text, first.text);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_receive_time() {
        let store = MemoryStore::new();
        store.append(&event("bbbb0002", 10)).await.unwrap();
        store.append(&event("aaaa0001", 20)).await.unwrap();
        store.append(&event("cccc0003", 0)).await.unwrap();

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["cccc0003", "bbbb0002", "aaaa0001"]);
    }

    #[tokio::test]
    async fn test_statistics_start_zeroed() {
        let store = MemoryStore::new();
        assert_eq!(store.load().await.unwrap(), FeedbackStatistics::default());
    }
}
