//! The `GenomeStore` trait and supporting result types.
//!
//! The trait is implemented by storage backends (e.g. `snpr-store-sqlite`).
//! The ingest pipeline depends on this abstraction, not on any concrete
//! backend.

use std::collections::HashSet;

use crate::{
  upload::{UploadDescriptor, UploadId, UserId},
  variant::WriteOp,
};

// ─── Result type ─────────────────────────────────────────────────────────────

/// Row counts reported by [`GenomeStore::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedBatch {
  pub variants_inserted:     usize,
  pub observations_inserted: usize,
  pub noops:                 usize,
}

impl AppliedBatch {
  /// Tally `op` into the counters.
  pub fn record(&mut self, op: &WriteOp) {
    match op {
      WriteOp::InsertGlobalVariant(_) => self.variants_inserted += 1,
      WriteOp::InsertUserObservation(_) => self.observations_inserted += 1,
      WriteOp::NoOp { .. } => self.noops += 1,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the two catalogs and the upload table.
///
/// Calls are synchronous and blocking. Membership snapshots are loaded once
/// per run; the store is never asked whether a single key exists.
pub trait GenomeStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve an upload descriptor by id. Returns `None` if not found.
  fn get_upload(
    &self,
    id: UploadId,
  ) -> Result<Option<UploadDescriptor>, Self::Error>;

  /// Names of every variant in the global catalog.
  fn known_variants(&self) -> Result<HashSet<String>, Self::Error>;

  /// Names of every variant the given user already has an observation for.
  fn known_user_variants(
    &self,
    user_id: UserId,
  ) -> Result<HashSet<String>, Self::Error>;

  /// Apply `ops` in order as a single all-or-nothing transaction.
  ///
  /// [`WriteOp::NoOp`] entries are counted but write nothing. On error no
  /// row from `ops` survives.
  fn apply(&mut self, ops: &[WriteOp]) -> Result<AppliedBatch, Self::Error>;

  /// Post-commit maintenance (compaction and planner statistics) on both
  /// catalogs.
  fn maintain(&mut self) -> Result<(), Self::Error>;
}
