//! Role domain model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RollcallError;

/// Closed set of account roles. `Student` is the least privileged and
/// the default for new accounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Secretary,
    #[default]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Secretary => "secretary",
            Role::Student => "student",
        }
    }

    /// Roles allowed to manage the whole roster (listing, sync).
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Secretary)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "secretary" => Ok(Role::Secretary),
            "student" => Ok(Role::Student),
            other => Err(RollcallError::validation(format!("unknown role: {other}"))),
        }
    }
}
