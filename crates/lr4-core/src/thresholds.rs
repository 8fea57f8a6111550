//! Tunable analysis thresholds and their operational defaults.

use serde::{Deserialize, Serialize};

/// Thresholds driving daily analysis and alerting.
///
/// Every field has a default so partial configuration files merge cleanly;
/// callers construct one at startup and pass it down, never read ambient
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Usage at or below this count triggers the usage alert.
    pub low_usage_threshold: usize,
    /// Usage at or above this count triggers the usage alert.
    pub high_usage_threshold: usize,
    /// Average weight at or below this many pounds is alert-worthy.
    pub min_healthy_weight: f64,
    /// Average weight at or above this many pounds is alert-worthy.
    pub max_healthy_weight: f64,
    /// Weight readings below this many pounds are sensor noise.
    pub min_valid_weight: f64,
    /// Weight readings above this many pounds are sensor noise.
    pub max_valid_weight: f64,
    /// Waste drawer fill percentage that triggers the waste alert.
    pub waste_alert_threshold: u8,
    /// Allowance for the robot's own clean-cycle delay setting, in minutes.
    pub cycle_delay_minutes: i64,
    /// Allowance for the length of a normal visit, in minutes.
    pub usage_duration_minutes: i64,
    /// Weight-session length that suggests a stuck cat sensor.
    pub consecutive_weight_threshold: usize,
    /// Days with at most this many events abort as insufficient data.
    pub min_daily_events: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_usage_threshold: 4,
            high_usage_threshold: 9,
            min_healthy_weight: 8.5,
            max_healthy_weight: 9.1,
            min_valid_weight: 7.5,
            max_valid_weight: 9.5,
            waste_alert_threshold: 75,
            cycle_delay_minutes: 25,
            usage_duration_minutes: 5,
            consecutive_weight_threshold: 3,
            min_daily_events: 1,
        }
    }
}

impl Thresholds {
    /// Total minutes a clean cycle may lag a visit before it counts as late.
    pub fn max_cycle_lag_minutes(&self) -> i64 {
        self.cycle_delay_minutes + self.usage_duration_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let thresholds = Thresholds::default();
        assert!(thresholds.low_usage_threshold < thresholds.high_usage_threshold);
        assert!(thresholds.min_healthy_weight < thresholds.max_healthy_weight);
        assert!(thresholds.min_valid_weight < thresholds.max_valid_weight);
        // The healthy band must sit inside the plausible band, or the
        // weight alert could never fire.
        assert!(thresholds.min_valid_weight < thresholds.min_healthy_weight);
        assert!(thresholds.max_healthy_weight < thresholds.max_valid_weight);
    }

    #[test]
    fn partial_toml_merges_over_defaults() {
        let parsed: Thresholds =
            serde_json::from_str(r#"{"waste_alert_threshold": 90, "min_daily_events": 3}"#)
                .expect("should deserialize");
        assert_eq!(parsed.waste_alert_threshold, 90);
        assert_eq!(parsed.min_daily_events, 3);
        assert_eq!(parsed.high_usage_threshold, 9);
    }

    #[test]
    fn cycle_lag_sums_both_allowances() {
        let thresholds = Thresholds {
            cycle_delay_minutes: 25,
            usage_duration_minutes: 5,
            ..Thresholds::default()
        };
        assert_eq!(thresholds.max_cycle_lag_minutes(), 30);
    }
}
