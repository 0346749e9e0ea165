//! Authentication error types.

use rollcall_core::error::RollcallError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("missing bearer token")]
    MissingToken,

    #[error("{0}")]
    Forbidden(String),

    /// Caller identity or target id absent after token verification ran.
    #[error("{0}")]
    Malformed(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for RollcallError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::MissingToken => RollcallError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::Forbidden(reason) => RollcallError::Forbidden { reason },
            AuthError::Malformed(reason) => RollcallError::Malformed { reason },
            AuthError::Crypto(msg) => RollcallError::Crypto(msg),
        }
    }
}
