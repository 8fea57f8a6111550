//! Grouping same-kind activity into sessions.
//!
//! A session is a maximal run of same-kind records where no record of a
//! *different* kind lands strictly between two consecutive members. Quiet
//! time alone never splits a run: two weight readings hours apart with
//! nothing in between are one session. This is deliberately not a
//! time-window rule; the robot's own event stream is the clock.

use chrono::{DateTime, Utc};

use crate::activity::{ActivityKind, ActivityRecord};

/// A maximal uninterrupted run of same-kind records.
///
/// Always holds at least one record; only [`group_sessions`] constructs
/// sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    kind: ActivityKind,
    events: Vec<ActivityRecord>,
}

impl Session {
    pub fn kind(&self) -> &ActivityKind {
        &self.kind
    }

    /// Member records in timestamp order.
    pub fn events(&self) -> &[ActivityRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the first member.
    pub fn start(&self) -> DateTime<Utc> {
        self.events[0].timestamp
    }

    /// Timestamp of the last member.
    pub fn end(&self) -> DateTime<Utc> {
        self.events[self.events.len() - 1].timestamp
    }
}

/// Groups records of `kind` into sessions.
///
/// The full record set is walked in timestamp order (stable on ties, so
/// equal timestamps keep their input order) with a single current-session
/// accumulator. A record of another kind arms a pending break; the break
/// only takes effect for a later member whose timestamp is strictly
/// greater, so records sharing a timestamp with a member never split its
/// session.
pub fn group_sessions(records: &[ActivityRecord], kind: &ActivityKind) -> Vec<Session> {
    let mut ordered: Vec<&ActivityRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.timestamp);

    let mut sessions = Vec::new();
    let mut current: Vec<ActivityRecord> = Vec::new();
    let mut pending_break: Option<DateTime<Utc>> = None;

    for record in ordered {
        if record.kind == *kind {
            if !current.is_empty() && pending_break.is_some_and(|b| b < record.timestamp) {
                sessions.push(Session {
                    kind: kind.clone(),
                    events: std::mem::take(&mut current),
                });
            }
            current.push(record.clone());
            pending_break = None;
        } else if pending_break.is_none() {
            if let Some(last) = current.last() {
                if record.timestamp > last.timestamp {
                    pending_break = Some(record.timestamp);
                }
            }
        }
    }

    if !current.is_empty() {
        sessions.push(Session {
            kind: kind.clone(),
            events: current,
        });
    }

    sessions
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 6, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn rec(minutes: i64, kind: ActivityKind) -> ActivityRecord {
        ActivityRecord {
            timestamp: ts(minutes),
            kind,
            value: None,
        }
    }

    fn weight(minutes: i64) -> ActivityRecord {
        rec(minutes, ActivityKind::WeightRecorded)
    }

    fn cycle(minutes: i64) -> ActivityRecord {
        rec(minutes, ActivityKind::CleanCycleInProgress)
    }

    #[test]
    fn empty_input_yields_no_sessions() {
        let sessions = group_sessions(&[], &ActivityKind::WeightRecorded);
        assert!(sessions.is_empty());
    }

    #[test]
    fn no_matching_kind_yields_no_sessions() {
        let records = vec![cycle(0), cycle(5)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert!(sessions.is_empty());
    }

    #[test]
    fn single_record_is_one_session() {
        let records = vec![weight(0)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 1);
        assert_eq!(sessions[0].start(), ts(0));
        assert_eq!(sessions[0].end(), ts(0));
    }

    #[test]
    fn ten_hour_gap_without_interruption_is_one_session() {
        // The defining behavior: gaps alone never split a session.
        let records = vec![weight(0), weight(600)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 2);
    }

    #[test]
    fn intervening_other_kind_splits_the_session() {
        let records = vec![weight(0), cycle(5), weight(10)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].len(), 1);
        assert_eq!(sessions[1].len(), 1);
        assert_eq!(sessions[1].start(), ts(10));
    }

    #[test]
    fn other_kind_sharing_a_member_timestamp_does_not_split() {
        // The break test is strict: an interloper at exactly a member's
        // timestamp is not strictly between the members.
        let records = vec![weight(0), cycle(10), weight(10)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 2);
    }

    #[test]
    fn other_kind_before_first_member_is_ignored() {
        let records = vec![cycle(0), weight(5), weight(10)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 2);
    }

    #[test]
    fn trailing_other_kind_does_not_open_a_session() {
        let records = vec![weight(0), cycle(5)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 1);
    }

    #[test]
    fn unsorted_input_is_sorted_before_grouping() {
        let records = vec![weight(10), cycle(5), weight(0)];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].start(), ts(0));
        assert_eq!(sessions[1].start(), ts(10));
    }

    #[test]
    fn sessions_partition_the_matching_records() {
        // Every matching record lands in exactly one session, in order.
        let records = vec![
            weight(0),
            weight(2),
            cycle(3),
            weight(7),
            rec(8, ActivityKind::CatDetected),
            weight(12),
            weight(40),
        ];
        let sessions = group_sessions(&records, &ActivityKind::WeightRecorded);

        assert_eq!(sessions.len(), 3);
        let flattened: Vec<DateTime<Utc>> = sessions
            .iter()
            .flat_map(|s| s.events().iter().map(|e| e.timestamp))
            .collect();
        assert_eq!(flattened, vec![ts(0), ts(2), ts(7), ts(12), ts(40)]);

        for pair in sessions.windows(2) {
            assert!(pair[0].end() < pair[1].start(), "sessions must not overlap");
        }
    }

    #[test]
    fn grouping_other_kind_uses_text_equality() {
        let note = ActivityKind::Other("Robot Power On".to_string());
        let records = vec![
            rec(0, note.clone()),
            rec(5, ActivityKind::Other("Robot Power Off".to_string())),
            rec(10, note.clone()),
        ];
        let sessions = group_sessions(&records, &note);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn grouping_is_deterministic_across_runs() {
        let records = vec![weight(0), weight(0), cycle(0), weight(5)];
        let first = group_sessions(&records, &ActivityKind::WeightRecorded);
        let second = group_sessions(&records, &ActivityKind::WeightRecorded);
        assert_eq!(first, second);
    }
}
