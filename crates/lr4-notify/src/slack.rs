//! Daily summary delivery as a Slack DM.
//!
//! Resolves the recipient from their Slack email, opens (or reuses) the
//! DM conversation, and posts the joined alert lines as one message. Every
//! Web API response carries the `{ok, error}` envelope; a false `ok` is an
//! error even when the HTTP status is 200.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default request timeout for Slack Web API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const API_BASE_URL: &str = "https://slack.com/api";

/// Slack delivery errors.
#[derive(Debug, Error)]
pub enum SlackError {
    /// The token or recipient email was unusable before any request.
    #[error("invalid Slack configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The Web API answered with `ok: false`.
    #[error("Slack {method} failed: {error}")]
    Api { method: &'static str, error: String },
    /// Failed to parse response.
    #[error("invalid response from {method}: {error}")]
    InvalidResponse { method: &'static str, error: String },
}

/// Slack Web API client for the summary channel.
#[derive(Clone)]
pub struct SlackMessenger {
    http: reqwest::Client,
    token: String,
    recipient_email: String,
}

impl fmt::Debug for SlackMessenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackMessenger")
            .field("token", &"[REDACTED]")
            .field("recipient_email", &self.recipient_email)
            .finish_non_exhaustive()
    }
}

impl SlackMessenger {
    /// Creates a messenger for the given bot token and recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the token or email is empty or whitespace-only,
    /// or if the HTTP client fails to build.
    pub fn new(
        token: impl Into<String>,
        recipient_email: impl Into<String>,
    ) -> Result<Self, SlackError> {
        let token = token.into();
        let recipient_email = recipient_email.into();

        if token.trim().is_empty() {
            return Err(SlackError::InvalidConfig {
                reason: "bot token cannot be empty",
            });
        }
        if recipient_email.trim().is_empty() {
            return Err(SlackError::InvalidConfig {
                reason: "recipient email cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(SlackError::ClientBuild)?;

        Ok(Self {
            http,
            token,
            recipient_email,
        })
    }

    /// Sends one summary DM to the configured recipient.
    pub async fn send_summary(&self, text: &str) -> Result<(), SlackError> {
        let user_id = self.lookup_user().await?;
        let channel_id = self.open_conversation(&user_id).await?;
        self.post_message(&channel_id, text).await?;
        debug!(lines = text.lines().count(), "sent Slack summary");
        Ok(())
    }

    async fn lookup_user(&self) -> Result<String, SlackError> {
        const METHOD: &str = "users.lookupByEmail";
        let body = self
            .http
            .get(format!("{API_BASE_URL}/{METHOD}"))
            .bearer_auth(&self.token)
            .query(&[("email", self.recipient_email.as_str())])
            .send()
            .await?
            .text()
            .await?;
        let payload: LookupResponse = parse_envelope(METHOD, &body)?;
        Ok(payload.user.id)
    }

    async fn open_conversation(&self, user_id: &str) -> Result<String, SlackError> {
        const METHOD: &str = "conversations.open";
        let body = self
            .http
            .post(format!("{API_BASE_URL}/{METHOD}"))
            .bearer_auth(&self.token)
            .json(&OpenRequest { users: user_id })
            .send()
            .await?
            .text()
            .await?;
        let payload: OpenResponse = parse_envelope(METHOD, &body)?;
        Ok(payload.channel.id)
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), SlackError> {
        const METHOD: &str = "chat.postMessage";
        let body = self
            .http
            .post(format!("{API_BASE_URL}/{METHOD}"))
            .bearer_auth(&self.token)
            .json(&PostRequest {
                channel: channel_id,
                text,
            })
            .send()
            .await?
            .text()
            .await?;
        parse_envelope::<PostResponse>(METHOD, &body)?;
        Ok(())
    }
}

/// Parses a Web API response, honoring the `{ok, error}` envelope before
/// the payload itself.
fn parse_envelope<T>(method: &'static str, body: &str) -> Result<T, SlackError>
where
    T: for<'de> Deserialize<'de>,
{
    let envelope: Envelope = serde_json::from_str(body).map_err(|err| {
        SlackError::InvalidResponse {
            method,
            error: err.to_string(),
        }
    })?;
    if !envelope.ok {
        return Err(SlackError::Api {
            method,
            error: envelope
                .error
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    serde_json::from_str(body).map_err(|err| SlackError::InvalidResponse {
        method,
        error: err.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
}

#[derive(Debug, Serialize)]
struct OpenRequest<'a> {
    users: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenResponse {
    channel: ChannelPayload,
}

#[derive(Debug, Deserialize)]
struct ChannelPayload {
    id: String,
}

#[derive(Debug, Serialize)]
struct PostRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostResponse {}
