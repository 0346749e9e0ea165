//! Outbound ports used by the sync engine.

use async_trait::async_trait;

use crate::error::SyncError;

/// One student as reported by the roster service. Every field is
/// optional on the wire; the engine validates per record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterRecord {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub external_id: Option<String>,
    pub role: Option<String>,
}

/// Source of truth for student enrollment.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch the complete roster. Any error aborts the whole sync run.
    async fn fetch_roster(&self) -> Result<Vec<RosterRecord>, SyncError>;
}

/// Welcome message for an account created by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeNotification {
    pub recipient_email: String,
    pub recipient_name: String,
    /// Plaintext temporary password. Never the stored hash.
    pub temporary_password: String,
}

/// Delivers onboarding notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_welcome(&self, notification: &WelcomeNotification) -> Result<(), SyncError>;
}
