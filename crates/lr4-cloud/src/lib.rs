//! Whisker cloud integration for the litter box monitor.
//!
//! Wraps the hosted API the robot reports to, exposing one high-level
//! operation: fetch the recent activity history together with the current
//! waste drawer level. Transport and auth failures all surface as a single
//! terminal [`CloudError`]; the caller decides what a failed fetch means
//! for the run.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lr4_core::RawActivity;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const LOGIN_URL: &str = "https://autopets.sso.iothings.site/oauth/token";
const API_BASE_URL: &str = "https://v2.api.whisker.iothings.site";

/// Cloud client errors.
#[derive(Debug, Error)]
pub enum CloudError {
    /// The provided credentials were unusable before any request was made.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The account has no robots to monitor.
    #[error("no robots registered on this account")]
    NoRobots,
}

/// One fetch of the robot's recent history.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySnapshot {
    /// Raw history entries, most recent first as the API returns them.
    pub activities: Vec<RawActivity>,
    /// Waste drawer fill percentage at fetch time.
    pub waste_drawer_level: u8,
}

/// Whisker cloud client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    username: String,
    password: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the given account.
    ///
    /// # Errors
    ///
    /// Returns an error if either credential is empty or whitespace-only,
    /// or if the HTTP client fails to build.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, CloudError> {
        let username = username.into();
        let password = password.into();

        if username.trim().is_empty() {
            return Err(CloudError::InvalidCredentials {
                reason: "username cannot be empty",
            });
        }
        if password.trim().is_empty() {
            return Err(CloudError::InvalidCredentials {
                reason: "password cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(CloudError::ClientBuild)?;

        Ok(Self {
            http,
            username,
            password,
        })
    }

    /// Fetches the account's first robot's recent activity history plus its
    /// current waste drawer level.
    pub async fn fetch_activity(&self, limit: u32) -> Result<ActivitySnapshot, CloudError> {
        let token = self.login().await?;
        let robot = self.primary_robot(&token).await?;
        let activities = self.activity_history(&token, &robot.id, limit).await?;
        Ok(ActivitySnapshot {
            activities,
            waste_drawer_level: robot.waste_drawer_level,
        })
    }

    async fn login(&self) -> Result<String, CloudError> {
        let request = LoginRequest {
            username: &self.username,
            password: &self.password,
        };
        let response = self.http.post(LOGIN_URL).json(&request).send().await?;
        let body = check_status(response).await?;
        let payload: LoginResponse = serde_json::from_str(&body)
            .map_err(|err| CloudError::InvalidResponse(err.to_string()))?;
        Ok(payload.access_token)
    }

    async fn primary_robot(&self, token: &str) -> Result<RobotPayload, CloudError> {
        let response = self
            .http
            .get(format!("{API_BASE_URL}/robots"))
            .bearer_auth(token)
            .send()
            .await?;
        let body = check_status(response).await?;
        let mut robots: Vec<RobotPayload> = serde_json::from_str(&body)
            .map_err(|err| CloudError::InvalidResponse(err.to_string()))?;
        if robots.is_empty() {
            return Err(CloudError::NoRobots);
        }
        Ok(robots.remove(0))
    }

    async fn activity_history(
        &self,
        token: &str,
        robot_id: &str,
        limit: u32,
    ) -> Result<Vec<RawActivity>, CloudError> {
        let response = self
            .http
            .get(format!("{API_BASE_URL}/robots/{robot_id}/activity"))
            .query(&[("limit", limit)])
            .bearer_auth(token)
            .send()
            .await?;
        let body = check_status(response).await?;
        let payload: Vec<ActivityPayload> = serde_json::from_str(&body)
            .map_err(|err| CloudError::InvalidResponse(err.to_string()))?;
        Ok(payload.into_iter().map(ActivityPayload::into_raw).collect())
    }
}

/// Returns the response body, mapping non-success statuses to [`CloudError::Api`].
async fn check_status(response: reqwest::Response) -> Result<String, CloudError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(parse_api_error(&body).unwrap_or_else(|| CloudError::Api {
            message: format!("status {status}: {body}"),
        }));
    }
    Ok(body)
}

fn parse_api_error(body: &str) -> Option<CloudError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| CloudError::Api {
            message: payload.error.message,
        })
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RobotPayload {
    id: String,
    waste_drawer_level: u8,
}

#[derive(Debug, Deserialize)]
struct ActivityPayload {
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    action: String,
}

impl ActivityPayload {
    fn into_raw(self) -> RawActivity {
        RawActivity {
            timestamp: self.timestamp,
            action: self.action,
        }
    }
}
