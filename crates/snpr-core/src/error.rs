//! Error types for `snpr-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("variant name must not be empty")]
  EmptyVariantName,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
