//! One-day review: classification, day filtering, and alert evaluation.
//!
//! Everything here is pure; the CLI owns fetching, persistence, and
//! notification delivery around these functions.

use tracing::debug;

use crate::activity::{ActivityRecord, ClassifyError, RawActivity, classify};
use crate::alert;
use crate::analyze::{Metrics, analyze};
use crate::day::DayWindow;
use crate::thresholds::Thresholds;

/// Result of reviewing one day of activity.
#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    /// Too few events landed in the window to analyze. Near-zero activity
    /// is itself the signal: the robot may be offline or the sensor dead.
    InsufficientData { observed: usize },
    /// The day held enough data.
    Report(DayReport),
}

/// Everything a reviewed day produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    /// Day-filtered records in timestamp order, ready for persistence.
    pub records: Vec<ActivityRecord>,
    pub metrics: Metrics,
    /// Alert lines in reporting order, possibly empty.
    pub alerts: Vec<String>,
}

/// Classifies raw history and keeps the records inside the window, sorted
/// by timestamp (stable on ties).
///
/// Classification runs over the full fetch before filtering: an entry
/// without a timestamp cannot be assigned to any day, so it aborts the run
/// instead of being dropped.
pub fn classify_day(
    activities: &[RawActivity],
    window: &DayWindow,
) -> Result<Vec<ActivityRecord>, ClassifyError> {
    let mut records = activities
        .iter()
        .map(classify)
        .collect::<Result<Vec<_>, _>>()?;
    records.retain(|record| window.contains(record.timestamp));
    records.sort_by_key(|record| record.timestamp);
    Ok(records)
}

/// Reviews one day end to end without touching any collaborator.
///
/// The insufficient-data check runs before any analysis so a dead day
/// never produces metrics, alerts, or rows to persist.
pub fn review_day(
    activities: &[RawActivity],
    waste_percent: u8,
    thresholds: &Thresholds,
    window: &DayWindow,
) -> Result<DayOutcome, ClassifyError> {
    let records = classify_day(activities, window)?;
    debug!(
        fetched = activities.len(),
        kept = records.len(),
        date = %window.date(),
        "classified day"
    );

    if records.len() <= thresholds.min_daily_events {
        return Ok(DayOutcome::InsufficientData {
            observed: records.len(),
        });
    }

    let metrics = analyze(&records, thresholds);
    let alerts = alert::evaluate(waste_percent, &metrics, thresholds);
    Ok(DayOutcome::Report(DayReport {
        records,
        metrics,
        alerts,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use chrono_tz::America::New_York;

    use super::*;
    use crate::activity::ActivityKind;

    fn window() -> DayWindow {
        DayWindow::for_date(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(), New_York)
    }

    /// Minutes past 06:00 local on the window's day.
    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 11, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn raw(minutes: i64, action: &str) -> RawActivity {
        RawActivity {
            timestamp: Some(ts(minutes)),
            action: action.to_string(),
        }
    }

    #[test]
    fn classify_day_filters_and_sorts() {
        let activities = vec![
            raw(10, "LitterBoxStatus.CLEAN_CYCLE"),
            raw(0, "LitterBoxStatus.CAT_DETECTED"),
            RawActivity {
                // The day before the window.
                timestamp: Some(ts(0) - Duration::days(1)),
                action: "LitterBoxStatus.CLEAN_CYCLE".to_string(),
            },
        ];
        let records = classify_day(&activities, &window()).expect("should classify");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ActivityKind::CatDetected);
        assert_eq!(records[1].kind, ActivityKind::CleanCycleInProgress);
    }

    #[test]
    fn malformed_entry_aborts_even_outside_the_window() {
        let activities = vec![
            raw(0, "LitterBoxStatus.CAT_DETECTED"),
            RawActivity {
                timestamp: None,
                action: "LitterBoxStatus.CLEAN_CYCLE".to_string(),
            },
        ];
        let err = classify_day(&activities, &window()).expect_err("should abort");
        assert!(matches!(err, ClassifyError::MissingTimestamp { .. }));
    }

    #[test]
    fn day_at_the_floor_is_insufficient() {
        let activities = vec![raw(0, "LitterBoxStatus.CLEAN_CYCLE")];
        let outcome =
            review_day(&activities, 40, &Thresholds::default(), &window()).expect("should review");
        assert_eq!(outcome, DayOutcome::InsufficientData { observed: 1 });
    }

    #[test]
    fn empty_day_is_insufficient() {
        let outcome =
            review_day(&[], 40, &Thresholds::default(), &window()).expect("should review");
        assert_eq!(outcome, DayOutcome::InsufficientData { observed: 0 });
    }

    #[test]
    fn only_windowed_events_count_toward_the_floor() {
        // Two events fetched, but one belongs to another day.
        let activities = vec![
            raw(0, "LitterBoxStatus.CLEAN_CYCLE"),
            RawActivity {
                timestamp: Some(ts(0) + Duration::days(2)),
                action: "LitterBoxStatus.CLEAN_CYCLE".to_string(),
            },
        ];
        let outcome =
            review_day(&activities, 40, &Thresholds::default(), &window()).expect("should review");
        assert_eq!(outcome, DayOutcome::InsufficientData { observed: 1 });
    }

    #[test]
    fn full_day_produces_a_report() {
        let activities = vec![
            raw(0, "LitterBoxStatus.CAT_DETECTED"),
            raw(1, "Pet Weight Recorded: 8.8 lbs"),
            raw(3, "LitterBoxStatus.CLEAN_CYCLE"),
            raw(6, "LitterBoxStatus.CLEAN_CYCLE_COMPLETE"),
            raw(200, "LitterBoxStatus.CAT_DETECTED"),
            raw(201, "Pet Weight Recorded: 9.0 lbs"),
            raw(203, "LitterBoxStatus.CLEAN_CYCLE"),
            raw(206, "LitterBoxStatus.CLEAN_CYCLE_COMPLETE"),
        ];
        let outcome =
            review_day(&activities, 80, &Thresholds::default(), &window()).expect("should review");

        let DayOutcome::Report(report) = outcome else {
            panic!("expected a report, got {outcome:?}");
        };
        assert_eq!(report.records.len(), 8);
        assert_eq!(report.metrics.usage_count, 2);
        let avg = report.metrics.average_weight.expect("should average");
        assert!((avg - 8.9).abs() < f64::EPSILON, "got {avg}");
        // Waste at 80 and usage at 2 trigger alerts; the 8.9 average is
        // healthy, so exactly those two fire, in that order.
        assert_eq!(report.alerts.len(), 2);
        assert!(report.alerts[0].starts_with("Waste basket is 80%"));
        assert!(report.alerts[1].contains("2 times"));
    }

    #[test]
    fn review_is_deterministic() {
        let activities = vec![
            raw(0, "LitterBoxStatus.CAT_DETECTED"),
            raw(1, "Pet Weight Recorded: 8.8 lbs"),
            raw(3, "LitterBoxStatus.CLEAN_CYCLE"),
        ];
        let first = review_day(&activities, 80, &Thresholds::default(), &window());
        let second = review_day(&activities, 80, &Thresholds::default(), &window());
        assert_eq!(first, second);
    }
}
