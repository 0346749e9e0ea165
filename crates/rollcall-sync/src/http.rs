//! Reqwest-backed roster and notification adapters.
//!
//! These adapters own transport details only: headers, timeouts, HTTP
//! error mapping and JSON decoding into port types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::config::SyncConfig;
use crate::dto::{RosterRecordDto, WelcomeRequestDto};
use crate::error::SyncError;
use crate::ports::{Notifier, RosterRecord, RosterSource, WelcomeNotification};

const ROSTER_SERVICE: &str = "roster";
const NOTIFICATION_SERVICE: &str = "notification";
const API_KEY_HEADER: &str = "x-api-key";

/// Roster source that GETs the full student list from one endpoint.
pub struct HttpRosterSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpRosterSource {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let endpoint = config.roster_endpoint().map_err(|e| SyncError::Transport {
            service: ROSTER_SERVICE,
            reason: format!("invalid endpoint: {e}"),
        })?;
        Self::new(endpoint, config.roster_api_key.clone(), config.request_timeout)
            .map_err(|e| map_transport_error(ROSTER_SERVICE, e))
    }
}

#[async_trait]
impl RosterSource for HttpRosterSource {
    async fn fetch_roster(&self) -> Result<Vec<RosterRecord>, SyncError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| map_transport_error(ROSTER_SERVICE, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(ROSTER_SERVICE, e))?;
        if !status.is_success() {
            return Err(map_status_error(ROSTER_SERVICE, status, body.as_ref()));
        }

        let records: Vec<RosterRecordDto> =
            serde_json::from_slice(body.as_ref()).map_err(|e| SyncError::Decode {
                service: ROSTER_SERVICE,
                reason: e.to_string(),
            })?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}

/// Notifier that POSTs welcome messages to the notification service.
pub struct HttpNotifier {
    client: Client,
    endpoint: Url,
}

impl HttpNotifier {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let endpoint = config.welcome_endpoint().map_err(|e| SyncError::Transport {
            service: NOTIFICATION_SERVICE,
            reason: format!("invalid endpoint: {e}"),
        })?;
        Self::new(endpoint, config.request_timeout)
            .map_err(|e| map_transport_error(NOTIFICATION_SERVICE, e))
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_welcome(&self, notification: &WelcomeNotification) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&WelcomeRequestDto::from(notification))
            .send()
            .await
            .map_err(|e| map_transport_error(NOTIFICATION_SERVICE, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(map_status_error(NOTIFICATION_SERVICE, status, body.as_ref()))
    }
}

fn map_transport_error(service: &'static str, error: reqwest::Error) -> SyncError {
    let reason = if error.is_timeout() {
        format!("timed out: {error}")
    } else {
        error.to_string()
    };
    SyncError::Transport { service, reason }
}

fn map_status_error(service: &'static str, status: StatusCode, body: &[u8]) -> SyncError {
    SyncError::Status {
        service,
        status: status.as_u16(),
        body: body_preview(body),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
