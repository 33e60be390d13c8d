//! Shared types for the kvdb workspace.
//!
//! This crate holds the pieces every other crate needs without pulling in
//! the storage engine:
//! - [`Settings`]: layered process configuration
//! - [`KvdbError`]: configuration and input errors

pub mod config;
pub mod error;

pub use config::Settings;
pub use error::KvdbError;
