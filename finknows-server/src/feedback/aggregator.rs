//! Cumulative statistics owner
//!
//! Every update runs load, record, save under one async mutex, so concurrent
//! submissions inside the process never lose an increment.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::model::FeedbackEvent;
use super::statistics::FeedbackStatistics;
use super::store::{StatisticsStore, StoreError};

pub struct FeedbackAggregator {
    store: Arc<dyn StatisticsStore>,
    update_lock: Mutex<()>,
}

impl FeedbackAggregator {
    pub fn new(store: Arc<dyn StatisticsStore>) -> Self {
        Self {
            store,
            update_lock: Mutex::new(()),
        }
    }

    /// Fold `event` into the persisted aggregate and return the new state
    pub async fn apply(&self, event: &FeedbackEvent) -> Result<FeedbackStatistics, StoreError> {
        let _guard = self.update_lock.lock().await;

        let mut stats = self.store.load().await?;
        stats.record(event);
        self.store.save(&stats).await?;

        debug!(
            "Statistics updated by {}: total={}, accuracy={:.3}",
            event.id, stats.total_feedback, stats.accuracy_rate
        );
        Ok(stats)
    }

    /// Current aggregate, read under the update lock
    pub async fn snapshot(&self) -> Result<FeedbackStatistics, StoreError> {
        let _guard = self.update_lock.lock().await;
        self.store.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::model::{FeedbackId, UserJudgment};
    use crate::feedback::store::MemoryStore;
    use chrono::Utc;

    fn event(judgment: UserJudgment) -> FeedbackEvent {
        FeedbackEvent {
            id: FeedbackId::generate(),
            text: "Market rally continues".to_string(),
            predicted_sentiment: "LABEL_2".to_string(),
            user_feedback: judgment,
            predicted_confidence: Some(0.88),
            timestamp: Utc::now(),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_apply_persists_each_update() {
        let store = Arc::new(MemoryStore::new());
        let aggregator = FeedbackAggregator::new(store.clone());

        aggregator.apply(&event(UserJudgment::Accurate)).await.unwrap();
        let stats = aggregator.apply(&event(UserJudgment::Inaccurate)).await.unwrap();

        assert_eq!(stats.total_feedback, 2);
        assert_eq!(stats.high_confidence_errors, 1);
        assert_eq!(store.load().await.unwrap(), stats);
        assert_eq!(aggregator.snapshot().await.unwrap(), stats);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_apply_loses_nothing() {
        let aggregator = Arc::new(FeedbackAggregator::new(Arc::new(MemoryStore::new())));

        let handles: Vec<_> = (0..200)
            .map(|i| {
                let aggregator = aggregator.clone();
                tokio::spawn(async move {
                    let judgment = if i % 4 == 0 {
                        UserJudgment::Inaccurate
                    } else {
                        UserJudgment::Accurate
                    };
                    aggregator.apply(&event(judgment)).await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = aggregator.snapshot().await.unwrap();
        assert_eq!(stats.total_feedback, 200);
        assert_eq!(stats.inaccurate_predictions, 50);
        assert_eq!(stats.accuracy_rate, 0.75);
        assert!(stats.is_consistent());
    }
}
