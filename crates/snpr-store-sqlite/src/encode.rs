//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings in UTC.

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use snpr_core::{
  upload::UploadDescriptor,
  variant::{CatalogVariant, UserObservation},
};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `genotypes` row.
pub struct RawUpload {
  pub id:       i64,
  pub user_id:  i64,
  pub filetype: String,
}

impl RawUpload {
  pub fn into_upload(self) -> UploadDescriptor {
    UploadDescriptor {
      id:            self.id,
      user_id:       self.user_id,
      source_format: self.filetype,
    }
  }
}

/// Raw values read directly from a `snps` row.
pub struct RawVariant {
  pub name:               String,
  pub chromosome:         String,
  pub position:           String,
  pub ranking:            String,
  pub allele_frequency:   String,
  pub genotype_frequency: String,
  pub user_snps_count:    i64,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawVariant {
  pub fn into_variant(self) -> Result<CatalogVariant> {
    Ok(CatalogVariant {
      name:               self.name,
      chromosome:         self.chromosome,
      position:           self.position,
      ranking:            Cow::Owned(self.ranking),
      allele_frequency:   Cow::Owned(self.allele_frequency),
      genotype_frequency: Cow::Owned(self.genotype_frequency),
      observation_count:  self.user_snps_count,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `user_snps` row.
pub struct RawObservation {
  pub snp_name:       String,
  pub user_id:        i64,
  pub genotype_id:    i64,
  pub local_genotype: String,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawObservation {
  pub fn into_observation(self) -> Result<UserObservation> {
    Ok(UserObservation {
      user_id:      self.user_id,
      genotype_id:  self.genotype_id,
      variant_name: self.snp_name,
      allele:       self.local_genotype,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}
