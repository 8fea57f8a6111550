//! Append-only activity log for the litter box monitor.
//!
//! Persists normalized records as CSV rows, one `timestamp,activity,value`
//! line per record. The log is append-only by contract: rows are never
//! rewritten, reordered, or deduplicated, and a failed append surfaces
//! instead of retrying so a blind retry can never duplicate rows.
//!
//! # Row Format
//!
//! Timestamps arrive pre-formatted in the robot's local time (e.g.
//! `2026-02-10 09:30:00-05:00`) so the file reads naturally next to the
//! robot's own app. There is no header line; the file is a log, not a
//! spreadsheet export. Fields containing a comma, quote, or newline are
//! quoted with doubled inner quotes.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Activity log errors.
#[derive(Debug, Error)]
pub enum LogError {
    /// An error from the underlying file.
    #[error("activity log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    /// Pre-formatted local timestamp.
    pub timestamp: String,
    /// Canonical activity label or passthrough text.
    pub activity: String,
    /// Embedded measurement, when the activity carried one.
    pub value: Option<f64>,
}

/// Append-only handle on the activity log file.
pub struct ActivityLog {
    file: File,
    path: PathBuf,
}

impl ActivityLog {
    /// Opens the log at the given path in append mode, creating the file
    /// and any missing parent directories.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Appends the rows in order, returning how many were written.
    pub fn append(&mut self, rows: &[LogRow]) -> Result<usize, LogError> {
        let mut content = String::new();
        for row in rows {
            content.push_str(&escape_field(&row.timestamp));
            content.push(',');
            content.push_str(&escape_field(&row.activity));
            content.push(',');
            if let Some(value) = row.value {
                content.push_str(&format_value(value));
            }
            content.push('\n');
        }

        self.file.write_all(content.as_bytes())?;
        self.file.flush()?;
        debug!(rows = rows.len(), path = %self.path.display(), "appended activity rows");
        Ok(rows.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Quotes a field when it contains CSV metacharacters.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Formats a value, keeping whole numbers free of a trailing `.0` so cycle
/// counts round-trip as integers.
fn format_value(value: f64) -> String {
    if (value.round() - value).abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
