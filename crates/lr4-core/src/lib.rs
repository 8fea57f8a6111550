//! Core domain logic for the litter box monitor.
//!
//! This crate contains the pure types and logic for:
//! - Classification: normalizing raw robot history into typed records
//! - Session grouping: joining same-kind runs split only by other activity
//! - Analysis: daily usage, weight, and latency metrics
//! - Alerting: threshold policy over the day's metrics

pub mod activity;
pub mod alert;
pub mod analyze;
pub mod day;
pub mod review;
pub mod session;
pub mod thresholds;

pub use activity::{ActivityKind, ActivityRecord, ClassifyError, RawActivity, classify};
pub use analyze::{Metrics, analyze};
pub use day::DayWindow;
pub use review::{DayOutcome, DayReport, classify_day, review_day};
pub use session::{Session, group_sessions};
pub use thresholds::Thresholds;
