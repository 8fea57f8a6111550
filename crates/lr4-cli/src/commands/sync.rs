//! Append today's activity to the log without alerting.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use chrono_tz::Tz;

use lr4_core::DayWindow;
use lr4_log::ActivityLog;

use crate::Config;
use crate::pipeline::{self, CloudSource, CsvSink};

pub fn run(config: &Config) -> Result<()> {
    let tz: Tz = config
        .monitor
        .timezone
        .parse()
        .map_err(|err| anyhow!("invalid timezone {:?}: {err}", config.monitor.timezone))?;
    let window = DayWindow::current_day(Utc::now(), tz);
    tracing::debug!(date = %window.date(), "syncing current day");

    let runtime =
        tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;

    let client = lr4_cloud::Client::new(&config.account.username, &config.account.password)
        .context("failed to create cloud client")?;
    let mut source = CloudSource::new(&runtime, client);

    let log = ActivityLog::open(&config.monitor.log_path)
        .with_context(|| format!("failed to open {}", config.monitor.log_path.display()))?;
    let mut sink = CsvSink::new(log);

    let written = pipeline::run_sync(
        &mut source,
        &mut sink,
        &window,
        config.monitor.activity_history_limit,
    )?;
    tracing::info!(records = written, "sync finished");
    Ok(())
}
