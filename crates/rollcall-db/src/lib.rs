//! Rollcall Database: SurrealDB connection management, schema
//! migrations, and the user store.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The [`UserRepository`](rollcall_core::repository::UserRepository)
//!   implementation ([`SurrealUserRepository`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::SurrealUserRepository;
pub use schema::{run_migrations, schema_v1};
