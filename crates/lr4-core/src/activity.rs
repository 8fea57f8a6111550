//! Activity kinds and raw-history classification.
//!
//! The robot's cloud history reports each entry as an opaque action string:
//! either a `LitterBoxStatus.*` status code or free text that may embed a
//! measurement. [`classify`] normalizes every entry into an
//! [`ActivityRecord`] without ever dropping one.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pre-compiled pattern for weight readings, e.g. `Pet Weight Recorded: 9.35 lbs`.
static WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Pet Weight Recorded: (\d+\.?\d*) lbs").unwrap());

/// Pre-compiled pattern for cycle counters, e.g. `Clean Cycles: 8`.
static CYCLE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Clean Cycles: (\d+)").unwrap());

/// One raw history entry as reported by the robot's cloud account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    /// Instant the robot recorded the entry, absent on malformed payloads.
    pub timestamp: Option<DateTime<Utc>>,
    /// Unparsed action text, either a status code or free text.
    pub action: String,
}

/// Canonical activity kinds for the litter box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    CatDetected,
    CycleInterrupted,
    CleanCycleInProgress,
    CleanCycleComplete,
    WeightRecorded,
    CleanCycles,
    /// Anything the classifier does not recognize, carried verbatim.
    Other(String),
}

impl ActivityKind {
    /// Canonical label, used for log rows and summaries.
    pub fn label(&self) -> &str {
        match self {
            Self::CatDetected => "Cat Detected",
            Self::CycleInterrupted => "Cycle Interrupted",
            Self::CleanCycleInProgress => "Clean Cycle In Progress",
            Self::CleanCycleComplete => "Clean Cycle Complete",
            Self::WeightRecorded => "Weight Recorded",
            Self::CleanCycles => "Clean Cycles",
            Self::Other(text) => text,
        }
    }

    /// Maps a `LitterBoxStatus.*` status code to its kind.
    fn from_status_code(code: &str) -> Option<Self> {
        match code {
            "LitterBoxStatus.CAT_SENSOR_INTERRUPTED" => Some(Self::CycleInterrupted),
            "LitterBoxStatus.CAT_DETECTED" => Some(Self::CatDetected),
            "LitterBoxStatus.CLEAN_CYCLE" => Some(Self::CleanCycleInProgress),
            "LitterBoxStatus.CLEAN_CYCLE_COMPLETE" => Some(Self::CleanCycleComplete),
            _ => None,
        }
    }

    /// Maps a canonical label back to its kind, keeping classification
    /// stable when already-normalized text comes around again.
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Cat Detected" => Some(Self::CatDetected),
            "Cycle Interrupted" => Some(Self::CycleInterrupted),
            "Clean Cycle In Progress" => Some(Self::CleanCycleInProgress),
            "Clean Cycle Complete" => Some(Self::CleanCycleComplete),
            "Weight Recorded" => Some(Self::WeightRecorded),
            "Clean Cycles" => Some(Self::CleanCycles),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for ActivityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_label(&s).unwrap_or(Self::Other(s)))
    }
}

/// A normalized history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    /// Embedded measurement: pounds for weight readings, a count for
    /// cycle counters, `None` for everything else.
    pub value: Option<f64>,
}

/// Errors produced while classifying raw history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The upstream payload carried no timestamp for this entry. Counting
    /// an undatable event into the wrong day would corrupt every metric
    /// downstream, so the whole run aborts instead.
    #[error("activity \"{action}\" has no timestamp")]
    MissingTimestamp { action: String },
}

/// Normalizes one raw history entry into a typed record.
///
/// Status codes map to their canonical kinds, measurement strings have
/// their numeric payload extracted, and anything else passes through
/// verbatim as [`ActivityKind::Other`]. Pure and total except for entries
/// without a timestamp.
pub fn classify(raw: &RawActivity) -> Result<ActivityRecord, ClassifyError> {
    let timestamp = raw.timestamp.ok_or_else(|| ClassifyError::MissingTimestamp {
        action: raw.action.clone(),
    })?;
    let (kind, value) = classify_action(&raw.action);
    Ok(ActivityRecord {
        timestamp,
        kind,
        value,
    })
}

/// Classifies the action text alone. First match wins; a given action
/// cannot embed both a weight and a cycle count.
fn classify_action(action: &str) -> (ActivityKind, Option<f64>) {
    if let Some(kind) = ActivityKind::from_status_code(action) {
        return (kind, None);
    }
    if let Some(kind) = ActivityKind::from_label(action) {
        return (kind, None);
    }
    if let Some(captures) = WEIGHT_RE.captures(action) {
        if let Ok(pounds) = captures[1].parse::<f64>() {
            return (ActivityKind::WeightRecorded, Some(pounds));
        }
    }
    if let Some(captures) = CYCLE_COUNT_RE.captures(action) {
        if let Ok(count) = captures[1].parse::<u32>() {
            return (ActivityKind::CleanCycles, Some(f64::from(count)));
        }
    }
    (ActivityKind::Other(action.to_string()), None)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn raw(action: &str) -> RawActivity {
        RawActivity {
            timestamp: Some(Utc.with_ymd_and_hms(2026, 2, 10, 14, 30, 0).unwrap()),
            action: action.to_string(),
        }
    }

    #[test]
    fn status_codes_map_to_kinds() {
        let cases = [
            (
                "LitterBoxStatus.CAT_SENSOR_INTERRUPTED",
                ActivityKind::CycleInterrupted,
            ),
            ("LitterBoxStatus.CAT_DETECTED", ActivityKind::CatDetected),
            (
                "LitterBoxStatus.CLEAN_CYCLE",
                ActivityKind::CleanCycleInProgress,
            ),
            (
                "LitterBoxStatus.CLEAN_CYCLE_COMPLETE",
                ActivityKind::CleanCycleComplete,
            ),
        ];

        for (code, expected) in cases {
            let record = classify(&raw(code)).expect("should classify");
            assert_eq!(record.kind, expected, "wrong kind for {code}");
            assert_eq!(record.value, None);
        }
    }

    #[test]
    fn weight_reading_extracts_pounds() {
        let record = classify(&raw("Pet Weight Recorded: 9.35 lbs")).expect("should classify");
        assert_eq!(record.kind, ActivityKind::WeightRecorded);
        assert_eq!(record.value, Some(9.35));
    }

    #[test]
    fn weight_reading_without_fraction_parses() {
        let record = classify(&raw("Pet Weight Recorded: 9 lbs")).expect("should classify");
        assert_eq!(record.kind, ActivityKind::WeightRecorded);
        assert_eq!(record.value, Some(9.0));
    }

    #[test]
    fn cycle_counter_extracts_count() {
        let record = classify(&raw("Clean Cycles: 8")).expect("should classify");
        assert_eq!(record.kind, ActivityKind::CleanCycles);
        assert_eq!(record.value, Some(8.0));
    }

    #[test]
    fn unrecognized_action_passes_through_verbatim() {
        let record = classify(&raw("LitterBoxStatus.OFFLINE")).expect("should classify");
        assert_eq!(
            record.kind,
            ActivityKind::Other("LitterBoxStatus.OFFLINE".to_string())
        );
        assert_eq!(record.value, None);
    }

    #[test]
    fn weight_without_unit_is_not_a_reading() {
        let record = classify(&raw("Pet Weight Recorded: 9.35")).expect("should classify");
        assert_eq!(
            record.kind,
            ActivityKind::Other("Pet Weight Recorded: 9.35".to_string())
        );
    }

    #[test]
    fn classification_is_stable_on_its_own_labels() {
        // Passthrough text and canonical labels both classify to the same
        // kind a second time around, so re-ingesting written rows is safe.
        let inputs = [
            "LitterBoxStatus.CAT_DETECTED",
            "Pet Weight Recorded: 8.8 lbs",
            "Clean Cycles: 3",
            "Some unknown note",
        ];

        for input in inputs {
            let first = classify(&raw(input)).expect("should classify");
            let again = classify(&raw(first.kind.label())).expect("should classify");
            assert_eq!(again.kind, first.kind, "unstable for {input}");
        }
    }

    #[test]
    fn missing_timestamp_is_an_error() {
        let malformed = RawActivity {
            timestamp: None,
            action: "LitterBoxStatus.CAT_DETECTED".to_string(),
        };
        let err = classify(&malformed).expect_err("should fail");
        assert_eq!(
            err.to_string(),
            "activity \"LitterBoxStatus.CAT_DETECTED\" has no timestamp"
        );
    }

    #[test]
    fn kind_serde_roundtrip() {
        let kinds = [
            ActivityKind::CatDetected,
            ActivityKind::CycleInterrupted,
            ActivityKind::CleanCycleInProgress,
            ActivityKind::CleanCycleComplete,
            ActivityKind::WeightRecorded,
            ActivityKind::CleanCycles,
            ActivityKind::Other("Robot Power On".to_string()),
        ];

        for kind in kinds {
            let json = serde_json::to_string(&kind).expect("should serialize");
            let parsed: ActivityKind = serde_json::from_str(&json).expect("should deserialize");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn record_serializes_with_label() {
        let record = classify(&raw("LitterBoxStatus.CLEAN_CYCLE")).expect("should classify");
        let json = serde_json::to_string(&record).expect("should serialize");
        assert!(json.contains("\"Clean Cycle In Progress\""), "got {json}");
    }
}
