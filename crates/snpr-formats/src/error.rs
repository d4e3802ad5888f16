//! Error types for the snpr-formats codec.

use thiserror::Error;

use crate::SourceFormat;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown genotype file format: {0:?}")]
  UnknownFormat(String),

  #[error("malformed {format} line ({reason}): {line:?}")]
  MalformedLine {
    format: SourceFormat,
    line:   String,
    reason: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
