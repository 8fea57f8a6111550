//! Review yesterday's activity: log it and alert on anomalies.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use chrono_tz::Tz;

use lr4_core::DayWindow;
use lr4_log::ActivityLog;
use lr4_notify::{MailConfig, Mailer, SlackMessenger};

use crate::Config;
use crate::pipeline::{self, CloudSource, CsvSink, Notifier};

pub fn run(config: &Config) -> Result<()> {
    let tz: Tz = config
        .monitor
        .timezone
        .parse()
        .map_err(|err| anyhow!("invalid timezone {:?}: {err}", config.monitor.timezone))?;
    // Pinned once; everything downstream reuses the same boundaries.
    let window = DayWindow::previous_day(Utc::now(), tz);
    tracing::debug!(date = %window.date(), "reviewing previous day");

    let runtime =
        tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;

    let client = lr4_cloud::Client::new(&config.account.username, &config.account.password)
        .context("failed to create cloud client")?;
    let mut source = CloudSource::new(&runtime, client);

    let log = ActivityLog::open(&config.monitor.log_path)
        .with_context(|| format!("failed to open {}", config.monitor.log_path.display()))?;
    let mut sink = CsvSink::new(log);

    let mailer = Mailer::new(&MailConfig {
        host: config.email.smtp_host.clone(),
        port: config.email.smtp_port,
        address: config.account.username.clone(),
        password: config.email.password.clone(),
    })
    .context("failed to create mailer")?;
    let slack = SlackMessenger::new(&config.slack.bot_token, &config.slack.email)
        .context("failed to create Slack messenger")?;
    let mut channel = Notifier::new(&runtime, mailer, slack);

    let summary = pipeline::run_review(
        &mut source,
        &mut sink,
        &mut channel,
        &config.thresholds,
        &window,
        config.monitor.activity_history_limit,
    )?;
    tracing::info!(
        records = summary.records_logged,
        alerts = summary.alerts_sent,
        "review finished"
    );
    Ok(())
}
