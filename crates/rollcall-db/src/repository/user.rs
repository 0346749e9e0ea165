//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords are hashed with Argon2id inside the write path: every
//! create or update that carries a plaintext password goes through
//! [`SurrealUserRepository::prepare_password`] before the statement is
//! built. Uniqueness of email, national id and external id is enforced
//! by unique indexes, so two concurrent writers cannot both succeed.

use chrono::{DateTime, Utc};
use rollcall_auth::password;
use rollcall_core::error::RollcallResult;
use rollcall_core::models::role::Role;
use rollcall_core::models::user::{
    CreateUser, LifecycleState, ReconcileUser, UpdateUser, User, UserCredentials,
};
use rollcall_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    national_id: Option<String>,
    external_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    national_id: Option<String>,
    external_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<LifecycleState, DbError> {
    match s {
        "active" => Ok(LifecycleState::Active),
        "inactive" => Ok(LifecycleState::Inactive),
        other => Err(DbError::Corrupt(format!("unknown lifecycle state: {other}"))),
    }
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    s.parse::<Role>()
        .map_err(|_| DbError::Corrupt(format!("unknown role: {s}")))
}

impl UserRow {
    fn into_credentials(self, id: Uuid) -> Result<UserCredentials, DbError> {
        Ok(UserCredentials {
            user: User {
                id,
                name: self.name,
                email: self.email,
                role: parse_role(&self.role)?,
                lifecycle_state: parse_status(&self.status)?,
                national_id: self.national_id,
                external_id: self.external_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            password_hash: self.password_hash,
        })
    }

    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        self.into_credentials(id).map(|c| c.user)
    }
}

impl UserRowWithId {
    fn try_into_credentials(self) -> Result<UserCredentials, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        UserRow {
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            status: self.status,
            national_id: self.national_id,
            external_id: self.external_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_credentials(id)
    }

    fn try_into_user(self) -> Result<User, DbError> {
        self.try_into_credentials().map(|c| c.user)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    /// Turn the password carried by a write into the value to store.
    ///
    /// `None` means the write does not touch the password and nothing is
    /// hashed. A value that is already a PHC hash is refused rather than
    /// hashed a second time.
    fn prepare_password(&self, password: Option<&str>) -> Result<Option<String>, DbError> {
        let Some(plaintext) = password else {
            return Ok(None);
        };
        if password::is_password_hash(plaintext) {
            return Err(DbError::Validation(
                "refusing to store an already-hashed password".into(),
            ));
        }
        password::hash_password(plaintext, self.pepper.as_deref())
            .map(Some)
            .map_err(|e| DbError::Hash(e.to_string()))
    }

    /// Select the active user matching `filter`, which must compare a
    /// column against `$value`.
    async fn active_credentials_where(
        &self,
        filter: &str,
        value: String,
    ) -> Result<Option<UserCredentials>, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE {filter} AND status = 'active'"
        );
        let mut result = self.db.query(&query).bind(("value", value)).await?;
        let rows: Vec<UserRowWithId> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(UserRowWithId::try_into_credentials)
            .transpose()
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> RollcallResult<User> {
        let input = input.normalized()?;
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = self
            .prepare_password(Some(&input.password))?
            .ok_or_else(|| DbError::Hash("no password hash produced".into()))?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, \
                 role = $role, status = 'active', \
                 national_id = $national_id, \
                 external_id = $external_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("national_id", input.national_id))
            .bind(("external_id", input.external_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        debug!(user_id = %id, "User record created");
        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RollcallResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('user', $id) \
                 WHERE status = 'active'",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.into_user(id))
            .transpose()?)
    }

    async fn get_credentials(&self, credential_key: &str) -> RollcallResult<Option<UserCredentials>> {
        let key = credential_key.trim();
        if key.is_empty() {
            return Ok(None);
        }

        // Email first (stored lower-cased), then national id.
        if let Some(found) = self
            .active_credentials_where("email = $value", key.to_lowercase())
            .await?
        {
            return Ok(Some(found));
        }

        Ok(self
            .active_credentials_where("national_id = $value", key.to_string())
            .await?)
    }

    async fn list_active(&self) -> RollcallResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE status = 'active' \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(UserRowWithId::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> RollcallResult<Option<User>> {
        let input = input.normalized()?;
        let password_hash = self.prepare_password(input.password.as_deref())?;

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.national_id.is_some() {
            sets.push("national_id = $national_id");
        }
        sets.push("updated_at = time::now()");

        // The status guard keeps inactive records out of reach.
        let query = format!(
            "UPDATE type::record('user', $id) SET {} \
             WHERE status = 'active'",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(hash) = password_hash {
            builder = builder.bind(("password_hash", hash));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }
        if let Some(national_id) = input.national_id {
            builder = builder.bind(("national_id", national_id));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.into_user(id))
            .transpose()?)
    }

    async fn soft_delete(&self, id: Uuid) -> RollcallResult<Option<User>> {
        // Soft-delete: set status to inactive.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 status = 'inactive', updated_at = time::now() \
                 WHERE status = 'active'",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.into_user(id))
            .transpose()?)
    }

    async fn find_by_correlation(
        &self,
        national_id: &str,
        external_id: &str,
    ) -> RollcallResult<Option<User>> {
        // Any lifecycle state: reconciliation must see soft-deleted rows.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE national_id = $national_id \
                 OR external_id = $external_id \
                 LIMIT 1",
            )
            .bind(("national_id", national_id.trim().to_string()))
            .bind(("external_id", external_id.trim().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(UserRowWithId::try_into_user)
            .transpose()?)
    }

    async fn reconcile(&self, id: Uuid, input: ReconcileUser) -> RollcallResult<User> {
        let id_str = id.to_string();
        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 name = $name, email = $email, role = $role, \
                 national_id = $national_id, external_id = $external_id, \
                 status = 'active', updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("national_id", input.national_id))
            .bind(("external_id", input.external_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        debug!(user_id = %id, "User record reconciled");
        Ok(row.into_user(id)?)
    }
}
