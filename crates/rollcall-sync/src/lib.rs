//! Rollcall Sync: reconciles the external student roster into the
//! user store.
//!
//! The [`SyncEngine`] pulls the full roster through a [`RosterSource`],
//! upserts each record by national id or external id, reactivates
//! soft-deleted accounts the roster still lists, and sends new accounts
//! their temporary password through a [`Notifier`]. The reqwest-backed
//! adapters in [`http`] talk to the real roster and notification
//! services.

pub mod config;
pub mod dto;
pub mod engine;
pub mod error;
pub mod http;
pub mod ports;
pub mod summary;

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::SyncError;
pub use ports::{Notifier, RosterRecord, RosterSource, WelcomeNotification};
pub use summary::{NotificationFailure, SyncFailure, SyncSummary};
