//! Variant types — the canonical record produced from one genotype line and
//! the catalog rows written for it.
//!
//! A [`VariantRecord`] is produced fresh per input line and consumed once by
//! the reconciler. Catalog rows are created exactly once per key and are never
//! updated in place by the ingest worker.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  upload::{UploadId, UserId},
};

// ─── Placeholders ────────────────────────────────────────────────────────────

/// Allele frequency blob written for every new catalog variant.
///
/// Frequencies are not tallied by the ingest worker; the blob is written once
/// and left for a later statistics job.
pub const ALLELE_FREQUENCY_PLACEHOLDER: &str = "---\nA: 0\nT: 0\nG: 0\nC: 0\n";

/// Genotype frequency blob written for every new catalog variant.
pub const GENOTYPE_FREQUENCY_PLACEHOLDER: &str = "--- {}\n";

/// Ranking assigned to a freshly catalogued variant.
pub const DEFAULT_RANKING: &str = "0";

// ─── Canonical record ────────────────────────────────────────────────────────

/// One normalised genotype call.
///
/// Every vendor format is reduced to this shape before reconciliation.
/// `position` is kept as opaque text: malformed vendor input may carry
/// non-numeric positions and the worker does not interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
  variant_name: String,
  chromosome:   String,
  position:     String,
  allele:       String,
}

impl VariantRecord {
  /// Assemble a record from the four positional fields of a decoded line.
  ///
  /// The name is kept verbatim; chromosome and allele are upper-cased
  /// (`mt` → `MT`, `ag` → `AG`).
  pub fn new(
    variant_name: impl Into<String>,
    chromosome: &str,
    position: impl Into<String>,
    allele: &str,
  ) -> Result<Self> {
    let variant_name = variant_name.into();
    if variant_name.is_empty() {
      return Err(Error::EmptyVariantName);
    }
    Ok(Self {
      variant_name,
      chromosome: chromosome.to_uppercase(),
      position: position.into(),
      allele: allele.to_uppercase(),
    })
  }

  pub fn variant_name(&self) -> &str { &self.variant_name }

  pub fn chromosome(&self) -> &str { &self.chromosome }

  pub fn position(&self) -> &str { &self.position }

  pub fn allele(&self) -> &str { &self.allele }
}

// ─── Catalog rows ────────────────────────────────────────────────────────────

/// A row of the global variant catalog, keyed by `name`.
///
/// Rows built by [`CatalogVariant::first_seen`] borrow the placeholder
/// constants; rows read back from a store own their text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVariant {
  pub name:               String,
  pub chromosome:         String,
  pub position:           String,
  pub ranking:            Cow<'static, str>,
  pub allele_frequency:   Cow<'static, str>,
  pub genotype_frequency: Cow<'static, str>,
  /// Fixed at insert time; later observations by other users do not bump it.
  pub observation_count:  i64,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl CatalogVariant {
  /// Build the catalog row for a variant seen for the first time.
  pub fn first_seen(record: &VariantRecord, now: DateTime<Utc>) -> Self {
    Self {
      name:               record.variant_name.clone(),
      chromosome:         record.chromosome.clone(),
      position:           record.position.clone(),
      ranking:            Cow::Borrowed(DEFAULT_RANKING),
      allele_frequency:   Cow::Borrowed(ALLELE_FREQUENCY_PLACEHOLDER),
      genotype_frequency: Cow::Borrowed(GENOTYPE_FREQUENCY_PLACEHOLDER),
      observation_count:  1,
      created_at:         now,
      updated_at:         now,
    }
  }
}

/// A user's observed genotype for one variant, keyed by
/// `(user_id, variant_name)`. First write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserObservation {
  pub user_id:      UserId,
  pub genotype_id:  UploadId,
  pub variant_name: String,
  pub allele:       String,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

// ─── Write operations ────────────────────────────────────────────────────────

/// A single catalog mutation produced by the reconciler.
///
/// Operations are accumulated over a whole file and handed to
/// [`GenomeStore::apply`](crate::store::GenomeStore::apply) in generation
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
  InsertGlobalVariant(CatalogVariant),
  InsertUserObservation(UserObservation),
  /// The user already has an observation for this variant. Kept in the
  /// stream so the run report can count re-observations.
  NoOp {
    user_id:      UserId,
    variant_name: String,
    allele:       String,
  },
}
