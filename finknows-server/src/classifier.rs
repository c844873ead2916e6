//! Sentiment classifier seam
//!
//! The model itself runs elsewhere; this module only defines the trait the
//! analyzer depends on and an HTTP client for a remote classifier service.
//!
//! Wire contract: `POST {"text": ...}` answered by
//! `{"scores": [negative, neutral, positive]}`.

use async_trait::async_trait;
use finknows_common::config::ClassifierConfig;
use finknows_common::{ClassScores, ClassificationResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("finknows/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The classifier could not be reached or timed out
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    /// The classifier answered with something unusable
    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),
}

/// Produces a classification for one document
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    scores: Vec<f64>,
}

/// Remote classifier over HTTP
pub struct HttpClassifier {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        tracing::debug!(chars = text.chars().count(), "Requesting classification");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::InvalidResponse(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let scores = ClassScores::from_probabilities(&body.scores)
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;
        let result = ClassificationResult::from_scores(scores);

        tracing::debug!(
            label = %result.label,
            confidence = result.confidence,
            "Classification received"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use finknows_common::Label;
    use serde_json::{json, Value};

    async fn spawn_classifier(reply: Value, status: axum::http::StatusCode) -> String {
        let app = Router::new().route(
            "/classify",
            post(move |Json(_body): Json<Value>| {
                let reply = reply.clone();
                async move { (status, Json(reply)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/classify", addr)
    }

    fn config(endpoint: String) -> ClassifierConfig {
        ClassifierConfig {
            endpoint,
            timeout_ms: 2000,
        }
    }

    #[tokio::test]
    async fn test_classify_parses_scores() {
        let endpoint =
            spawn_classifier(json!({"scores": [0.1, 0.2, 0.7]}), axum::http::StatusCode::OK).await;
        let classifier = HttpClassifier::new(&config(endpoint)).unwrap();

        let result = classifier.classify("Profits rose").await.unwrap();
        assert_eq!(result.label, Label::Positive);
        assert_eq!(result.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_malformed_scores_rejected() {
        let endpoint =
            spawn_classifier(json!({"scores": [0.5, 0.6]}), axum::http::StatusCode::OK).await;
        let classifier = HttpClassifier::new(&config(endpoint)).unwrap();

        let err = classifier.classify("Profits rose").await.unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_error_status_rejected() {
        let endpoint = spawn_classifier(
            json!({"detail": "model not loaded"}),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        )
        .await;
        let classifier = HttpClassifier::new(&config(endpoint)).unwrap();

        let err = classifier.classify("Profits rose").await.unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidResponse(ref m) if m.starts_with("HTTP 500")));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let classifier =
            HttpClassifier::new(&config(format!("http://{}/classify", addr))).unwrap();
        let err = classifier.classify("Profits rose").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }
}
