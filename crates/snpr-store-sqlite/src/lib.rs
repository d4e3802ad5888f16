//! SQLite backend for the SNP ingestion worker.
//!
//! Wraps a single blocking [`rusqlite::Connection`]; one ingest run owns one
//! store for its whole lifetime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
