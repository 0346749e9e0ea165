//! Domain models for Rollcall.

pub mod role;
pub mod user;
