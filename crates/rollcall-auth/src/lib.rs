//! Rollcall Auth: credential hashing, JWT issuance/validation, the
//! authorization policy, and the account service built on them.

pub mod config;
pub mod error;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput};
pub use token::{AccessTokenClaims, ValidatedClaims};
