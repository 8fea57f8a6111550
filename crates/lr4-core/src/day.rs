//! Calendar-day windows in the robot's local timezone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A half-open UTC interval `[start, end)` covering one local calendar day.
///
/// The window is pinned once at the start of a run; every later filter and
/// timestamp conversion reuses the same boundaries, so a run that straddles
/// midnight cannot shift mid-computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
}

impl DayWindow {
    /// Window for the previous calendar day relative to `now`.
    pub fn previous_day(now: DateTime<Utc>, tz: Tz) -> Self {
        let yesterday = now.with_timezone(&tz).date_naive() - Duration::days(1);
        Self::for_date(yesterday, tz)
    }

    /// Window for the current calendar day relative to `now`.
    pub fn current_day(now: DateTime<Utc>, tz: Tz) -> Self {
        Self::for_date(now.with_timezone(&tz).date_naive(), tz)
    }

    /// Window for a specific local date.
    pub fn for_date(date: NaiveDate, tz: Tz) -> Self {
        let start = local_midnight_to_utc(date, tz);
        let end = local_midnight_to_utc(date + Duration::days(1), tz);
        Self {
            date,
            start,
            end,
            tz,
        }
    }

    /// The local calendar date this window covers.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `ts` falls inside the window.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// Converts a UTC instant to the window's local time.
    pub fn localize(&self, ts: DateTime<Utc>) -> DateTime<Tz> {
        ts.with_timezone(&self.tz)
    }
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    match tz.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            // Use 1am local which is guaranteed to exist
            let one_am = date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap());
            tz.from_local_datetime(&one_am).unwrap().with_timezone(&Utc)
        }
    }
}
