//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use lr4_core::Thresholds;

/// Application configuration.
///
/// Every field has a default so a partial config file or a handful of
/// `LR4_*` environment variables is enough to run. Nested sections map to
/// double-underscore environment keys, e.g. `LR4_ACCOUNT__PASSWORD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub account: AccountConfig,
    pub monitor: MonitorConfig,
    pub thresholds: Thresholds,
    pub email: EmailConfig,
    pub slack: SlackConfig,
}

/// Whisker cloud account credentials. The username doubles as the email
/// address urgent warnings are sent to and from.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What to monitor and where to keep the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// IANA timezone the robot lives in; day boundaries are local.
    pub timezone: String,
    /// How many history entries to request per fetch.
    pub activity_history_limit: u32,
    /// Where the append-only CSV log lives.
    pub log_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            timezone: "America/New_York".to_string(),
            activity_history_limit: 300,
            log_path: data_dir.join("activity.csv"),
        }
    }
}

/// SMTP relay settings for the urgent channel.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Relay password (an app password for Gmail).
    pub password: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            password: String::new(),
        }
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Slack settings for the summary channel.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub bot_token: String,
    /// Slack account email of the person to DM.
    pub email: String,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (LR4_*), nested via "__"
        figment = figment.merge(Env::prefixed("LR4_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for lr4.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lr4"))
}

/// Returns the platform-specific data directory for lr4.
///
/// On Linux: `~/.local/share/lr4`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("lr4"))
}
