//! Error taxonomy for an ingest run.
//!
//! Nothing in a run is retried or recovered locally. Every variant here ends
//! the run; the binary logs it once and exits non-zero.

use snpr_core::upload::UploadId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(String),

  #[error("genotype upload {0} not found")]
  NotFound(UploadId),

  /// The upload names a vendor format the codec does not support.
  #[error(transparent)]
  Format(snpr_formats::Error),

  /// A data line that breaks its format's layout.
  #[error("line {number}: {source}")]
  Line {
    number: usize,
    #[source]
    source: snpr_formats::Error,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
