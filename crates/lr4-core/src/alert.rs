//! Threshold policy turning a day's metrics into alert lines.

use crate::analyze::Metrics;
use crate::thresholds::Thresholds;

/// Evaluates alert conditions in their fixed reporting order.
///
/// Conditions are cumulative, each contributes at most one line, and a day
/// that triggers nothing produces an empty list so the caller sends
/// nothing.
pub fn evaluate(waste_percent: u8, metrics: &Metrics, thresholds: &Thresholds) -> Vec<String> {
    let mut alerts = Vec::new();

    if waste_percent >= thresholds.waste_alert_threshold {
        alerts.push(format!(
            "Waste basket is {waste_percent}% full. Please change ASAP."
        ));
    }

    if metrics.usage_count >= thresholds.high_usage_threshold
        || metrics.usage_count <= thresholds.low_usage_threshold
    {
        alerts.push(format!(
            ":poop: Cats used bathroom {} times yesterday. Please monitor.",
            metrics.usage_count
        ));
    }

    if let Some(avg) = metrics.average_weight {
        if avg <= thresholds.min_healthy_weight || avg >= thresholds.max_healthy_weight {
            alerts.push(format!(
                "Avg Weight yesterday = {avg:.1} lbs. Please investigate."
            ));
        }
    }

    if metrics.has_long_delay {
        alerts.push(format!(
            "A clean cycle lagged a visit by more than {} minutes yesterday. Please check the robot.",
            thresholds.max_cycle_lag_minutes()
        ));
    }

    if metrics.has_long_session {
        alerts.push(format!(
            "{} or more back-to-back weight readings yesterday. Please check the cat sensor.",
            thresholds.consecutive_weight_threshold
        ));
    }

    alerts
}
