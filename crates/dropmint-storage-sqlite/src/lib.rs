//! SQLite storage for Dropmint
//!
//! Persists each project's sale waves and their whitelist entries. Saving a project's
//! waves replaces the whole set inside one transaction.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod database;
pub mod error;
pub mod migrations;
pub mod repository;

pub use database::Database;
pub use error::{Error, Result};
pub use repository::{ProjectRevision, Repository, BASE_BACKOFF_MS, MAX_BACKOFF_MS, MAX_BUSY_RETRIES};
