//! HTTP API handlers for finknows-server

pub mod analyze;
pub mod feedback;
pub mod health;

pub use analyze::analyze;
pub use feedback::{feedback_report, feedback_statistics, submit_feedback};
pub use health::health_routes;
