//! Result of a sync run.

use rollcall_core::error::RollcallError;
use serde::Serialize;

/// Counts and failures for one sync run. `created + updated + skipped +
/// failed_count == total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed_count: usize,
    pub failures: Vec<SyncFailure>,
    /// Welcome messages that could not be delivered. The accounts they
    /// belong to were still created.
    pub notification_failures: Vec<NotificationFailure>,
}

impl SyncSummary {
    pub(crate) fn record_failure(&mut self, failure: SyncFailure) {
        self.failed_count += 1;
        self.failures.push(failure);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    /// National id of the offending record, or `"missing national id"`.
    pub national_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFailure {
    pub email: String,
    pub reason: String,
}

/// Human-readable reason for a per-record failure.
pub fn failure_reason(err: &RollcallError) -> String {
    match err {
        RollcallError::Validation { message } => format!("validation error: {message}"),
        RollcallError::Duplicate { fields } => {
            format!("duplicate value for field(s): {}", fields.join(", "))
        }
        other => other.to_string(),
    }
}
