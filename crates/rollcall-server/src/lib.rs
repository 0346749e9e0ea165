//! Rollcall Server: HTTP surface over the auth service and the roster
//! sync engine.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::{Cli, ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
