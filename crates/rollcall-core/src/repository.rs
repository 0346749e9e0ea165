//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Unless a method says otherwise,
//! reads and writes only see records whose lifecycle state is `active`.

use uuid::Uuid;

use crate::error::RollcallResult;
use crate::models::user::{CreateUser, ReconcileUser, UpdateUser, User, UserCredentials};

pub trait UserRepository: Send + Sync {
    /// Create an active user. Fails with `Duplicate` when the email,
    /// national id or external id is already taken by any record,
    /// including inactive ones.
    fn create(&self, input: CreateUser) -> impl Future<Output = RollcallResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RollcallResult<Option<User>>> + Send;

    /// Resolve a login key (email, then national id) to an active user
    /// and its password hash. The only read path that exposes the hash.
    fn get_credentials(
        &self,
        credential_key: &str,
    ) -> impl Future<Output = RollcallResult<Option<UserCredentials>>> + Send;

    fn list_active(&self) -> impl Future<Output = RollcallResult<Vec<User>>> + Send;

    /// Update an active user. Returns `None` when the record is missing
    /// or inactive; an update never reactivates a record.
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = RollcallResult<Option<User>>> + Send;

    /// Soft-delete: sets the lifecycle state to inactive. Returns `None`
    /// when the record is missing or already inactive.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = RollcallResult<Option<User>>> + Send;

    /// Find a user in any lifecycle state whose national id OR external
    /// id matches.
    fn find_by_correlation(
        &self,
        national_id: &str,
        external_id: &str,
    ) -> impl Future<Output = RollcallResult<Option<User>>> + Send;

    /// Overwrite roster-owned fields and force the record active.
    fn reconcile(
        &self,
        id: Uuid,
        input: ReconcileUser,
    ) -> impl Future<Output = RollcallResult<User>> + Send;
}
