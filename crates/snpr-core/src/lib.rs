//! Core types and trait definitions for the SNP ingestion worker.
//!
//! This crate is deliberately free of file-format and database dependencies.
//! The format codec, the storage backends and the ingest binary all depend on
//! it; it depends on nothing proprietary.

pub mod error;
pub mod reconcile;
pub mod store;
pub mod upload;
pub mod variant;

pub use error::{Error, Result};
