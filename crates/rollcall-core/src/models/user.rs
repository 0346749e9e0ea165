//! User domain model.
//!
//! [`User`] is the read representation and deliberately has no password
//! field; the stored hash only ever leaves the store inside
//! [`UserCredentials`], which is not serializable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RollcallError, RollcallResult};
use crate::models::role::Role;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Active,
    Inactive,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub lifecycle_state: LifecycleState,
    pub national_id: Option<String>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.lifecycle_state == LifecycleState::Active
    }
}

/// A user together with its stored password hash. Returned only by the
/// credential lookup used during login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub role: Role,
    pub national_id: Option<String>,
    pub external_id: Option<String>,
}

impl CreateUser {
    /// Trim and case-normalize every field, rejecting missing values.
    pub fn normalized(self) -> RollcallResult<Self> {
        if self.password.is_empty() {
            return Err(RollcallError::validation("password is required"));
        }
        Ok(Self {
            name: normalize_name(&self.name)?,
            email: normalize_email(&self.email)?,
            password: self.password,
            role: self.role,
            national_id: normalize_optional(self.national_id),
            external_id: normalize_optional(self.external_id),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Raw replacement password. `None` leaves the stored hash untouched.
    pub password: Option<String>,
    pub role: Option<Role>,
    pub national_id: Option<String>,
}

impl UpdateUser {
    pub fn normalized(self) -> RollcallResult<Self> {
        if matches!(self.password.as_deref(), Some("")) {
            return Err(RollcallError::validation("password must not be empty"));
        }
        Ok(Self {
            name: self.name.as_deref().map(normalize_name).transpose()?,
            email: self.email.as_deref().map(normalize_email).transpose()?,
            password: self.password,
            role: self.role,
            national_id: normalize_optional(self.national_id),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.national_id.is_none()
    }
}

/// Field refresh applied by roster reconciliation. Unlike [`UpdateUser`]
/// it also forces the record back to [`LifecycleState::Active`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub national_id: String,
    pub external_id: String,
}

pub fn normalize_name(name: &str) -> RollcallResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RollcallError::validation("name is required"));
    }
    Ok(trimmed.to_string())
}

pub fn normalize_email(email: &str) -> RollcallResult<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(RollcallError::validation("email is required"));
    }
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(normalized),
        _ => Err(RollcallError::validation(format!(
            "email is not a valid address: {normalized}"
        ))),
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
