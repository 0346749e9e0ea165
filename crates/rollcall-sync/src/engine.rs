//! Roster reconciliation.
//!
//! A run fetches the full roster, then processes records one at a time:
//! correlate by national id or external id, refresh and reactivate
//! accounts whose roster-owned fields drifted, and create accounts the
//! store has never seen. A failing record is recorded in the summary and
//! never aborts the rest of the batch. Welcome notifications are
//! dispatched on detached tasks: a slow or failing notification service
//! cannot affect the writes, and cancelling a run does not cancel
//! delivery for accounts it already created.

use std::collections::HashSet;
use std::sync::Arc;

use rollcall_auth::config::AuthConfig;
use rollcall_auth::password::generate_temporary_password;
use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::role::Role;
use rollcall_core::models::user::{
    CreateUser, LifecycleState, ReconcileUser, User, normalize_email, normalize_name,
};
use rollcall_core::repository::UserRepository;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::ports::{Notifier, RosterRecord, RosterSource, WelcomeNotification};
use crate::summary::{NotificationFailure, SyncFailure, SyncSummary, failure_reason};

const MISSING_NATIONAL_ID: &str = "missing national id";

/// Roster record after validation and normalization.
#[derive(Debug, Clone, PartialEq)]
struct MappedRecord {
    name: String,
    email: String,
    national_id: String,
    external_id: String,
    role: Role,
}

impl MappedRecord {
    fn differs_from(&self, user: &User) -> bool {
        self.name != user.name || self.email != user.email || self.role != user.role
    }

    fn into_reconcile(self) -> ReconcileUser {
        ReconcileUser {
            name: self.name,
            email: self.email,
            role: self.role,
            national_id: self.national_id,
            external_id: self.external_id,
        }
    }
}

enum RecordOutcome {
    Created(WelcomeNotification),
    Updated,
    Skipped,
}

/// Reconciles the external roster into the user store.
pub struct SyncEngine<R: UserRepository> {
    user_repo: R,
    roster: Arc<dyn RosterSource>,
    notifier: Arc<dyn Notifier>,
    temporary_password_bytes: usize,
    notification_attempts: u32,
    // Serializes runs within this process.
    run_guard: Mutex<()>,
}

impl<R: UserRepository> SyncEngine<R> {
    pub fn new(
        user_repo: R,
        roster: Arc<dyn RosterSource>,
        notifier: Arc<dyn Notifier>,
        auth_config: &AuthConfig,
        sync_config: &SyncConfig,
    ) -> Self {
        Self {
            user_repo,
            roster,
            notifier,
            temporary_password_bytes: auth_config.temporary_password_bytes,
            notification_attempts: sync_config.notification_attempts.max(1),
            run_guard: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.user_repo
    }

    /// Run one full reconciliation.
    ///
    /// Fails with `UpstreamUnavailable` only when the roster cannot be
    /// fetched, in which case nothing has been written. Every per-record
    /// problem ends up in the returned summary instead.
    pub async fn run(&self) -> RollcallResult<SyncSummary> {
        let _guard = self.run_guard.lock().await;

        let records = self.roster.fetch_roster().await.map_err(|e| {
            error!(error = %e, action = "fetch_roster", "Roster fetch failed, aborting sync");
            RollcallError::from(e)
        })?;
        info!(records = records.len(), "Roster sync started");

        let mut summary = SyncSummary {
            total: records.len(),
            ..Default::default()
        };
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let mut pending = HashSet::new();

        for record in &records {
            match self.process_record(record).await {
                Ok(RecordOutcome::Created(welcome)) => {
                    summary.created += 1;
                    pending.insert(welcome.recipient_email.clone());
                    tokio::spawn(deliver_welcome(
                        Arc::clone(&self.notifier),
                        welcome,
                        self.notification_attempts,
                        report_tx.clone(),
                    ));
                }
                Ok(RecordOutcome::Updated) => summary.updated += 1,
                Ok(RecordOutcome::Skipped) => summary.skipped += 1,
                Err(err) => {
                    let failure = SyncFailure {
                        national_id: present(&record.national_id)
                            .unwrap_or(MISSING_NATIONAL_ID)
                            .to_string(),
                        external_id: present(&record.external_id).map(str::to_string),
                        reason: failure_reason(&err),
                    };
                    warn!(
                        national_id = %failure.national_id,
                        reason = %failure.reason,
                        "Roster record failed"
                    );
                    summary.record_failure(failure);
                }
            }
        }

        // The channel closes once every delivery task has reported or died.
        drop(report_tx);
        while let Some(report) = report_rx.recv().await {
            match report {
                Ok(email) => {
                    pending.remove(&email);
                }
                Err(failure) => {
                    pending.remove(&failure.email);
                    summary.notification_failures.push(failure);
                }
            }
        }
        for email in pending {
            error!(
                action = "notification_failure",
                email = %email,
                "Welcome notification task ended without reporting"
            );
            summary.notification_failures.push(NotificationFailure {
                email,
                reason: "notification task ended without reporting".into(),
            });
        }

        info!(
            total = summary.total,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed_count,
            notification_failures = summary.notification_failures.len(),
            "Roster sync finished"
        );
        Ok(summary)
    }

    async fn process_record(&self, record: &RosterRecord) -> RollcallResult<RecordOutcome> {
        let mapped = map_record(record)?;

        let existing = self
            .user_repo
            .find_by_correlation(&mapped.national_id, &mapped.external_id)
            .await?;

        match existing {
            Some(user) => {
                let reactivate = user.lifecycle_state == LifecycleState::Inactive;
                if !reactivate && !mapped.differs_from(&user) {
                    return Ok(RecordOutcome::Skipped);
                }
                let updated = self
                    .user_repo
                    .reconcile(user.id, mapped.into_reconcile())
                    .await?;
                info!(
                    action = "update_reactivate",
                    user_id = %updated.id,
                    reactivated = reactivate,
                    "Account refreshed from roster"
                );
                Ok(RecordOutcome::Updated)
            }
            None => {
                let temporary_password = generate_temporary_password(self.temporary_password_bytes);
                let created = self
                    .user_repo
                    .create(CreateUser {
                        name: mapped.name,
                        email: mapped.email,
                        password: temporary_password.clone(),
                        role: mapped.role,
                        national_id: Some(mapped.national_id),
                        external_id: Some(mapped.external_id),
                    })
                    .await?;
                info!(
                    action = "create_account",
                    user_id = %created.id,
                    "Account created from roster"
                );
                Ok(RecordOutcome::Created(WelcomeNotification {
                    recipient_email: created.email,
                    recipient_name: created.name,
                    temporary_password,
                }))
            }
        }
    }
}

async fn deliver_welcome(
    notifier: Arc<dyn Notifier>,
    welcome: WelcomeNotification,
    attempts: u32,
    report: mpsc::UnboundedSender<Result<String, NotificationFailure>>,
) {
    // The run may have been cancelled; a closed channel is fine.
    let _ = report.send(send_with_retries(notifier.as_ref(), welcome, attempts).await);
}

async fn send_with_retries(
    notifier: &dyn Notifier,
    welcome: WelcomeNotification,
    attempts: u32,
) -> Result<String, NotificationFailure> {
    let mut last_error = None;
    for attempt in 1..=attempts {
        match notifier.send_welcome(&welcome).await {
            Ok(()) => {
                debug!(email = %welcome.recipient_email, "Welcome notification delivered");
                return Ok(welcome.recipient_email);
            }
            Err(e) => {
                warn!(
                    action = "notification_failure",
                    email = %welcome.recipient_email,
                    attempt,
                    error = %e,
                    "Welcome notification failed"
                );
                last_error = Some(e);
            }
        }
    }
    Err(NotificationFailure {
        email: welcome.recipient_email,
        reason: last_error.map_or_else(|| "not attempted".to_string(), |e| e.to_string()),
    })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, field: &str) -> RollcallResult<&'a str> {
    present(value).ok_or_else(|| RollcallError::validation(format!("{field} is required")))
}

fn map_record(record: &RosterRecord) -> RollcallResult<MappedRecord> {
    let national_id = required(&record.national_id, "national id")?;
    let external_id = required(&record.external_id, "external id")?;
    let email = normalize_email(required(&record.email, "email")?)?;
    let name = normalize_name(required(&record.full_name, "full name")?)?;
    let role = match present(&record.role) {
        Some(raw) => roster_role(raw)?,
        None => Role::Student,
    };
    Ok(MappedRecord {
        name,
        email,
        national_id: national_id.to_string(),
        external_id: external_id.to_string(),
        role,
    })
}

/// The roster service names roles in Spanish; accept those alongside
/// the canonical names.
fn roster_role(raw: &str) -> RollcallResult<Role> {
    match raw.trim().to_lowercase().as_str() {
        "alumno" | "alumna" | "estudiante" => Ok(Role::Student),
        "secretaria" | "secretario" => Ok(Role::Secretary),
        "administrador" | "administradora" => Ok(Role::Admin),
        other => other.parse(),
    }
}
