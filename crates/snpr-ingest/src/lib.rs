//! Genotype ingestion for the SNP catalogs.
//!
//! Streams one vendor genotype export, normalises every data line and
//! reconciles it against the global variant catalog and the uploading user's
//! observations, committing all new rows in one transaction. Works against
//! any [`GenomeStore`](snpr_core::store::GenomeStore).

pub mod error;
pub mod pipeline;
pub mod settings;

pub use error::{Error, Result};
pub use pipeline::{IngestReport, ingest, ingest_file};
pub use settings::IngestSettings;

// ─── Integration tests ────────────────────────────────────────────────────────
