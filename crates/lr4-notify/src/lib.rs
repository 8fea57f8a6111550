//! Notification delivery for the litter box monitor.
//!
//! Two independent channels: an SMTP [`mail::Mailer`] for urgent
//! warnings (API failures, dead days) and a [`slack::SlackMessenger`]
//! that DMs the day's accumulated alerts. Both are fire-and-forget from
//! the caller's perspective; neither retries.

pub mod mail;
pub mod slack;

pub use mail::{MailConfig, MailError, Mailer};
pub use slack::{SlackError, SlackMessenger};
