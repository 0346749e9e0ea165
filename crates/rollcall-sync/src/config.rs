//! Sync configuration.

use std::time::Duration;

use url::Url;

/// Endpoints and limits for the roster and notification adapters.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the roster service.
    pub roster_base_url: Url,
    /// Shared key sent in the `x-api-key` header.
    pub roster_api_key: String,
    /// Path appended to the base URL to list the roster (default `/alumnos`).
    pub roster_path: String,
    /// Base URL of the notification service.
    pub notification_base_url: Url,
    /// Per-request timeout for both services.
    pub request_timeout: Duration,
    /// Delivery attempts per welcome notification (1 = no retry).
    pub notification_attempts: u32,
}

impl SyncConfig {
    pub const DEFAULT_ROSTER_PATH: &'static str = "/alumnos";
    pub const WELCOME_PATH: &'static str = "/send/welcome";

    pub fn new(roster_base_url: Url, roster_api_key: String, notification_base_url: Url) -> Self {
        Self {
            roster_base_url,
            roster_api_key,
            roster_path: Self::DEFAULT_ROSTER_PATH.into(),
            notification_base_url,
            request_timeout: Duration::from_secs(10),
            notification_attempts: 1,
        }
    }

    pub fn roster_endpoint(&self) -> Result<Url, url::ParseError> {
        endpoint(&self.roster_base_url, &self.roster_path)
    }

    pub fn welcome_endpoint(&self) -> Result<Url, url::ParseError> {
        endpoint(&self.notification_base_url, Self::WELCOME_PATH)
    }
}

/// Append `path` to whatever path `base` already carries.
fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
}
