//! Daily metrics over classified activity.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::activity::{ActivityKind, ActivityRecord};
use crate::session::group_sessions;
use crate::thresholds::Thresholds;

/// Aggregates for one monitored day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Number of clean cycles started, one per visit.
    pub usage_count: usize,
    /// Mean of plausible weight readings, when any survive filtering.
    pub average_weight: Option<f64>,
    /// A clean cycle lagged a weight session beyond the allowance.
    pub has_long_delay: bool,
    /// A weight session ran long enough to suggest a stuck sensor.
    pub has_long_session: bool,
}

/// Computes daily metrics from day-filtered records.
///
/// The four sub-computations are independent; none needs the records in
/// any particular order.
pub fn analyze(records: &[ActivityRecord], thresholds: &Thresholds) -> Metrics {
    let usage_count = records
        .iter()
        .filter(|r| r.kind == ActivityKind::CleanCycleInProgress)
        .count();
    let average_weight = average_valid_weight(records, thresholds);

    let weight_sessions = group_sessions(records, &ActivityKind::WeightRecorded);

    let mut cycle_times: Vec<DateTime<Utc>> = records
        .iter()
        .filter(|r| r.kind == ActivityKind::CleanCycleInProgress)
        .map(|r| r.timestamp)
        .collect();
    cycle_times.sort_unstable();

    let max_lag = Duration::minutes(thresholds.max_cycle_lag_minutes());
    let has_long_delay = weight_sessions.iter().any(|session| {
        // Earliest cycle strictly after the session; sessions the robot
        // never followed up on contribute no delay signal.
        let next = cycle_times.partition_point(|&t| t <= session.end());
        cycle_times
            .get(next)
            .is_some_and(|&cycle| cycle - session.end() > max_lag)
    });

    let has_long_session = weight_sessions
        .iter()
        .any(|session| session.len() >= thresholds.consecutive_weight_threshold);

    Metrics {
        usage_count,
        average_weight,
        has_long_delay,
        has_long_session,
    }
}

/// Mean of weight readings inside the plausible range, `None` when no
/// reading survives.
#[expect(
    clippy::cast_precision_loss,
    reason = "daily weight sample counts are tiny"
)]
fn average_valid_weight(records: &[ActivityRecord], thresholds: &Thresholds) -> Option<f64> {
    let valid: Vec<f64> = records
        .iter()
        .filter(|r| r.kind == ActivityKind::WeightRecorded)
        .filter_map(|r| r.value)
        .filter(|w| (thresholds.min_valid_weight..=thresholds.max_valid_weight).contains(w))
        .collect();

    if valid.is_empty() {
        None
    } else {
        Some(valid.iter().sum::<f64>() / valid.len() as f64)
    }
}
