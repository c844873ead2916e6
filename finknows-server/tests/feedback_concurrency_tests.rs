//! Concurrent feedback submission against every storage backend
//!
//! Many simultaneous submissions must all land as distinct events and be
//! counted exactly once in the aggregate.

use finknows_common::config::StorageBackend;
use finknows_server::feedback::store::{open_stores, JsonDirStore, SqliteStore};
use finknows_server::feedback::{
    EventStore, FeedbackService, FeedbackStores, FeedbackSubmission, FeedbackStatistics,
    StatisticsStore,
};
use std::collections::HashSet;
use std::sync::Arc;

const SUBMISSIONS: usize = 1000;

fn submission(i: usize) -> FeedbackSubmission {
    let judgment = if i % 4 == 0 { "inaccurate" } else { "accurate" };
    FeedbackSubmission {
        text: Some(format!("Quarterly earnings report number {}", i)),
        predicted_sentiment: Some(format!("LABEL_{}", i % 3)),
        user_feedback: Some(judgment.to_string()),
        predicted_confidence: Some(if i % 8 == 0 { 0.9 } else { 0.6 }),
        timestamp: Some("2025-06-01T12:00:00Z".to_string()),
    }
}

/// Submit `SUBMISSIONS` events concurrently and check the aggregate
async fn submit_concurrently(stores: FeedbackStores) -> FeedbackStatistics {
    let service = Arc::new(FeedbackService::new(stores.clone()));

    let handles: Vec<_> = (0..SUBMISSIONS)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.submit(submission(i)).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        assert!(ids.insert(receipt.feedback_id), "duplicate id handed out");
    }

    let stats = service.statistics().await.unwrap();
    assert_eq!(stats.total_feedback, SUBMISSIONS as u64);
    assert_eq!(stats.inaccurate_predictions, 250);
    assert_eq!(stats.accurate_predictions, 750);
    assert_eq!(stats.accuracy_rate, 0.75);
    // Inaccurate and confidence 0.9: every multiple of 8
    assert_eq!(stats.high_confidence_errors, 125);
    assert_eq!(stats.sentiment_distribution.total(), SUBMISSIONS as u64);
    assert!(stats.is_consistent());

    assert_eq!(stores.events.list().await.unwrap().len(), SUBMISSIONS);
    stats
}

// =============================================================================
// Backends
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_submissions_memory() {
    submit_concurrently(FeedbackStores::in_memory()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_submissions_json_dir() {
    let dir = tempfile::tempdir().unwrap();
    let stores = open_stores(StorageBackend::Json, dir.path()).await.unwrap();

    let stats = submit_concurrently(stores).await;

    // The persisted aggregate agrees with the in-process view
    let reopened = JsonDirStore::open(dir.path()).await.unwrap();
    assert_eq!(reopened.load().await.unwrap(), stats);
    assert_eq!(reopened.list().await.unwrap().len(), SUBMISSIONS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_submissions_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let stores = open_stores(StorageBackend::Sqlite, dir.path()).await.unwrap();

    let stats = submit_concurrently(stores).await;

    let reopened = SqliteStore::open(&dir.path().join("feedback.db")).await.unwrap();
    assert_eq!(reopened.load().await.unwrap(), stats);
}

// =============================================================================
// Persistence round trip
// =============================================================================

#[tokio::test]
async fn test_recorded_events_survive_reopen() {
    for backend in [StorageBackend::Json, StorageBackend::Sqlite] {
        let dir = tempfile::tempdir().unwrap();
        let stores = open_stores(backend, dir.path()).await.unwrap();
        let service = FeedbackService::new(stores.clone());

        let receipt = service.submit(submission(3)).await.unwrap();
        let original = stores.events.get(&receipt.feedback_id).await.unwrap().unwrap();
        drop(service);
        drop(stores);

        let reopened = open_stores(backend, dir.path()).await.unwrap();
        let reread = reopened.events.get(&receipt.feedback_id).await.unwrap().unwrap();
        assert_eq!(reread, original, "round trip through {}", backend);
        assert_eq!(reopened.statistics.load().await.unwrap().total_feedback, 1);
    }
}
