//! Errors raised by the roster and notification adapters.

use rollcall_core::error::RollcallError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request to {service} failed: {reason}")]
    Transport { service: &'static str, reason: String },

    #[error("{service} responded with status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("could not decode {service} response: {reason}")]
    Decode { service: &'static str, reason: String },
}

impl SyncError {
    pub fn service(&self) -> &'static str {
        match self {
            SyncError::Transport { service, .. }
            | SyncError::Status { service, .. }
            | SyncError::Decode { service, .. } => service,
        }
    }
}

impl From<SyncError> for RollcallError {
    fn from(err: SyncError) -> Self {
        RollcallError::UpstreamUnavailable {
            service: err.service().to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_upstream_unavailable() {
        let err = SyncError::Status {
            service: "roster",
            status: 503,
            body: "maintenance".into(),
        };
        match RollcallError::from(err) {
            RollcallError::UpstreamUnavailable { service, reason } => {
                assert_eq!(service, "roster");
                assert!(reason.contains("503"));
                assert!(reason.contains("maintenance"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
