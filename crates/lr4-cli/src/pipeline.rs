//! Run orchestration over abstract collaborators.
//!
//! [`ActivitySource`], [`RecordSink`], and [`AlertChannel`] are the seam
//! between the pure daily review in `lr4-core` and the real cloud,
//! filesystem, and messaging collaborators, so every fatal path can be
//! exercised with in-memory fakes. The real adapters live here too and
//! wrap the async clients behind a blocking facade.

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use lr4_cloud::ActivitySnapshot;
use lr4_core::{ActivityRecord, DayOutcome, DayWindow, Thresholds, classify_day, review_day};
use lr4_log::{ActivityLog, LogRow};
use lr4_notify::{Mailer, SlackMessenger};

/// Subject line shared by every urgent warning.
const URGENT_SUBJECT: &str = "LR4 Data Warning";

/// Supplies raw history plus the waste drawer level.
pub trait ActivitySource {
    fn fetch(&mut self, limit: u32) -> Result<ActivitySnapshot>;
}

/// Accepts normalized rows for the append-only log.
pub trait RecordSink {
    fn append(&mut self, rows: &[LogRow]) -> Result<usize>;
}

/// Delivers urgent warnings and alert summaries on two distinct channels.
pub trait AlertChannel {
    fn send_urgent(&mut self, subject: &str, body: &str) -> Result<()>;
    fn send_summary(&mut self, body: &str) -> Result<()>;
}

/// What a completed review run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records_logged: usize,
    pub alerts_sent: usize,
}

/// Reviews one day end to end: fetch, review, persist, alert.
///
/// Fatal paths follow the error taxonomy: a failed fetch and a dead day
/// both warn by email before the run fails; a failed urgent send is logged
/// but never masks the root cause. Rows are appended before the summary
/// goes out, and a failed append is never retried.
pub fn run_review<S, K, C>(
    source: &mut S,
    sink: &mut K,
    channel: &mut C,
    thresholds: &Thresholds,
    window: &DayWindow,
    history_limit: u32,
) -> Result<RunSummary>
where
    S: ActivitySource,
    K: RecordSink,
    C: AlertChannel,
{
    let snapshot = match source.fetch(history_limit) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            let body = format!("API returned an error: {err:#}");
            if let Err(send_err) = channel.send_urgent(URGENT_SUBJECT, &body) {
                warn!(error = %send_err, "failed to send urgent email");
            }
            return Err(err.context("activity fetch failed"));
        }
    };

    let outcome = review_day(
        &snapshot.activities,
        snapshot.waste_drawer_level,
        thresholds,
        window,
    )?;

    let report = match outcome {
        DayOutcome::InsufficientData { observed } => {
            let body = format!(
                "Only {observed} activity event(s) were recorded on {}. The robot may be offline.",
                window.date()
            );
            if let Err(send_err) = channel.send_urgent(URGENT_SUBJECT, &body) {
                warn!(error = %send_err, "failed to send urgent email");
            }
            bail!("insufficient data: {observed} event(s) on {}", window.date());
        }
        DayOutcome::Report(report) => report,
    };

    let rows = log_rows(&report.records, window);
    sink.append(&rows).context("failed to append activity log")?;

    if report.alerts.is_empty() {
        info!(date = %window.date(), "no alerts triggered");
    } else {
        channel
            .send_summary(&report.alerts.join("\n"))
            .context("failed to send alert summary")?;
    }

    info!(
        records = rows.len(),
        alerts = report.alerts.len(),
        date = %window.date(),
        "review complete"
    );
    Ok(RunSummary {
        records_logged: rows.len(),
        alerts_sent: report.alerts.len(),
    })
}

/// Appends the window's activity to the log without analysis or alerts.
pub fn run_sync<S, K>(
    source: &mut S,
    sink: &mut K,
    window: &DayWindow,
    history_limit: u32,
) -> Result<usize>
where
    S: ActivitySource,
    K: RecordSink,
{
    let snapshot = source
        .fetch(history_limit)
        .context("activity fetch failed")?;
    let records = classify_day(&snapshot.activities, window)?;
    let rows = log_rows(&records, window);
    let written = sink.append(&rows).context("failed to append activity log")?;
    info!(records = written, date = %window.date(), "sync complete");
    Ok(written)
}

/// Formats records as log rows in the window's local time.
fn log_rows(records: &[ActivityRecord], window: &DayWindow) -> Vec<LogRow> {
    records
        .iter()
        .map(|record| LogRow {
            timestamp: window
                .localize(record.timestamp)
                .format("%Y-%m-%d %H:%M:%S%:z")
                .to_string(),
            activity: record.kind.label().to_string(),
            value: record.value,
        })
        .collect()
}

/// [`ActivitySource`] over the async cloud client.
pub struct CloudSource<'a> {
    runtime: &'a tokio::runtime::Runtime,
    client: lr4_cloud::Client,
}

impl<'a> CloudSource<'a> {
    pub fn new(runtime: &'a tokio::runtime::Runtime, client: lr4_cloud::Client) -> Self {
        Self { runtime, client }
    }
}

impl ActivitySource for CloudSource<'_> {
    fn fetch(&mut self, limit: u32) -> Result<ActivitySnapshot> {
        Ok(self.runtime.block_on(self.client.fetch_activity(limit))?)
    }
}

/// [`RecordSink`] over the append-only CSV log.
pub struct CsvSink {
    log: ActivityLog,
}

impl CsvSink {
    pub fn new(log: ActivityLog) -> Self {
        Self { log }
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, rows: &[LogRow]) -> Result<usize> {
        Ok(self.log.append(rows)?)
    }
}

/// [`AlertChannel`] over the real email and Slack clients.
pub struct Notifier<'a> {
    runtime: &'a tokio::runtime::Runtime,
    mailer: Mailer,
    slack: SlackMessenger,
}

impl<'a> Notifier<'a> {
    pub fn new(runtime: &'a tokio::runtime::Runtime, mailer: Mailer, slack: SlackMessenger) -> Self {
        Self {
            runtime,
            mailer,
            slack,
        }
    }
}

impl AlertChannel for Notifier<'_> {
    fn send_urgent(&mut self, subject: &str, body: &str) -> Result<()> {
        Ok(self.mailer.send_urgent(subject, body)?)
    }

    fn send_summary(&mut self, body: &str) -> Result<()> {
        Ok(self.runtime.block_on(self.slack.send_summary(body))?)
    }
}
