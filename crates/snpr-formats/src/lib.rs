//! Genotype export codec for the SNP ingestion worker.
//!
//! Converts one line of a vendor genotype export into a
//! [`snpr_core::variant::VariantRecord`]. Pure synchronous; no database
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use snpr_formats::{SourceFormat, prepare_line};
//!
//! let raw = "rs4477212\t1\t82154\tAA\n";
//! let line = prepare_line(raw).expect("data line");
//! let record = SourceFormat::TwentyThreeAndMe.normalize(&line).unwrap();
//! println!("{:?}", record);
//! ```

pub mod alias;
pub mod error;
mod normalize;

pub use error::{Error, Result};
use snpr_core::variant::VariantRecord;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ─── Formats ─────────────────────────────────────────────────────────────────

/// A supported vendor export format, named as the host application stores
/// it on the upload row.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum SourceFormat {
  /// Tab-separated `rsid, chromosome, position, genotype`.
  #[strum(serialize = "23andme")]
  TwentyThreeAndMe,
  /// Quoted CSV with an `RSID` header row; otherwise laid out like 23andMe.
  #[strum(serialize = "ftdna-illumina")]
  FtdnaIllumina,
  /// Tab-separated with the two alleles in separate columns.
  #[strum(serialize = "ancestry")]
  Ancestry,
  /// CSV with a `Name` header row.
  #[strum(serialize = "decodeme")]
  Decodeme,
  /// Single-sample VCF from the 23andMe exome product.
  #[strum(serialize = "23andme-exome-vcf")]
  TwentyThreeAndMeExomeVcf,
  /// Two-column `name, genotype` export.
  #[strum(serialize = "IYG")]
  Iyg,
}

impl SourceFormat {
  /// Parse the vendor string stored on an upload row. Matching is exact.
  pub fn from_vendor(name: &str) -> Result<Self> {
    name
      .parse()
      .map_err(|_| Error::UnknownFormat(name.to_owned()))
  }

  /// The vendor string for this format.
  pub fn as_vendor(self) -> &'static str { self.into() }

  /// Decode a prepared line (see [`prepare_line`]).
  ///
  /// Returns `Ok(None)` for header rows.
  pub fn normalize(self, line: &str) -> Result<Option<VariantRecord>> {
    normalize::normalize(self, line)
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Prepare a raw line for decoding.
///
/// Comment lines (leading `#`) and lines that are empty once the trailing
/// line terminator is removed yield `None`. Everything else is lower-cased.
pub fn prepare_line(raw: &str) -> Option<String> {
  if raw.starts_with('#') {
    return None;
  }
  let line = raw.trim_end_matches(['\n', '\r']);
  if line.is_empty() {
    return None;
  }
  Some(line.to_lowercase())
}

/// Decode `line` according to the vendor format named by `format`.
///
/// Fails with [`Error::UnknownFormat`] before looking at the line if the
/// format is not supported.
pub fn normalize(format: &str, line: &str) -> Result<Option<VariantRecord>> {
  SourceFormat::from_vendor(format)?.normalize(line)
}
