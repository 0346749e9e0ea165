//! Error types for the Rollcall system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollcallError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Duplicate value for field(s): {}", fields.join(", "))]
    Duplicate { fields: Vec<String> },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Request context that upstream middleware should have guaranteed
    /// is missing. Never caused by client input.
    #[error("Malformed request context: {reason}")]
    Malformed { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Upstream service {service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RollcallError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True for errors whose message is safe to show to API clients.
    pub fn is_client_facing(&self) -> bool {
        !matches!(
            self,
            Self::Malformed { .. } | Self::Database(_) | Self::Crypto(_) | Self::Internal(_)
        )
    }
}

pub type RollcallResult<T> = Result<T, RollcallError>;
