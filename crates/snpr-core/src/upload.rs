//! Upload descriptor — the genotype file a single ingest run works on.

use serde::{Deserialize, Serialize};

/// Primary key of a user row in the host application.
pub type UserId = i64;

/// Primary key of a genotype upload row.
pub type UploadId = i64;

/// A genotype upload as registered by the host application.
///
/// Loaded once at the start of a run and read-only afterwards. The format is
/// kept as the raw vendor string; decoding it is the codec's job, so an
/// unknown format surfaces as a codec error rather than a storage one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
  pub id:            UploadId,
  pub user_id:       UserId,
  pub source_format: String,
}
