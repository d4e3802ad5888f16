//! Per-format line decoders.
//!
//! Pipeline:
//!   prepared &str
//!     └─ decode_<format>()   → Option<Fields>   (None = header row)
//!          └─ Fields::into_record() → VariantRecord
//!
//! Every decoder reduces its vendor layout to the same four positional
//! fields: name, chromosome, position, genotype.

use snpr_core::variant::VariantRecord;

use crate::{
  SourceFormat, alias,
  error::{Error, Result},
};

// ─── Positional fields ───────────────────────────────────────────────────────

struct Fields {
  name:       String,
  chromosome: String,
  position:   String,
  allele:     String,
}

impl Fields {
  fn new(
    name: impl Into<String>,
    chromosome: impl Into<String>,
    position: impl Into<String>,
    allele: impl Into<String>,
  ) -> Self {
    Self {
      name:       name.into(),
      chromosome: chromosome.into(),
      position:   position.into(),
      allele:     allele.into(),
    }
  }
}

// ─── Column access ───────────────────────────────────────────────────────────

/// A split line that reports missing columns as [`Error::MalformedLine`].
struct Columns<'a> {
  format: SourceFormat,
  line:   &'a str,
  cols:   Vec<&'a str>,
}

impl<'a> Columns<'a> {
  fn split(format: SourceFormat, line: &'a str, delimiter: char) -> Self {
    Self { format, line, cols: line.split(delimiter).collect() }
  }

  fn get(&self, index: usize) -> Result<&'a str> {
    self.cols.get(index).copied().ok_or_else(|| {
      self.malformed(format!(
        "expected at least {} columns, found {}",
        index + 1,
        self.cols.len()
      ))
    })
  }

  fn first(&self) -> &'a str { self.cols.first().copied().unwrap_or_default() }

  fn malformed(&self, reason: impl Into<String>) -> Error {
    malformed(self.format, self.line, reason)
  }
}

fn malformed(format: SourceFormat, line: &str, reason: impl Into<String>) -> Error {
  Error::MalformedLine {
    format,
    line: line.to_owned(),
    reason: reason.into(),
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

pub(crate) fn normalize(
  format: SourceFormat,
  line: &str,
) -> Result<Option<VariantRecord>> {
  let fields = match format {
    SourceFormat::TwentyThreeAndMe => decode_23andme(line)?,
    SourceFormat::FtdnaIllumina => decode_ftdna_illumina(line)?,
    SourceFormat::Ancestry => decode_ancestry(line)?,
    SourceFormat::Decodeme => decode_decodeme(line)?,
    SourceFormat::TwentyThreeAndMeExomeVcf => decode_exome_vcf(line)?,
    SourceFormat::Iyg => decode_iyg(line)?,
  };

  let Some(fields) = fields else {
    tracing::debug!(%format, "skipping header row");
    return Ok(None);
  };

  VariantRecord::new(
    fields.name,
    &fields.chromosome,
    fields.position,
    &fields.allele,
  )
  .map(Some)
  .map_err(|e| malformed(format, line, e.to_string()))
}

// ─── Decoders ────────────────────────────────────────────────────────────────

/// `rsid \t chromosome \t position \t genotype`, no header.
fn decode_23andme(line: &str) -> Result<Option<Fields>> {
  let cols = Columns::split(SourceFormat::TwentyThreeAndMe, line, '\t');
  four_columns(&cols).map(Some)
}

/// `"RSID","CHROMOSOME","POSITION","RESULT"` — quotes are dropped, then the
/// layout matches 23andMe.
fn decode_ftdna_illumina(line: &str) -> Result<Option<Fields>> {
  let unquoted = line.replace('"', "");
  let cols = Columns::split(SourceFormat::FtdnaIllumina, &unquoted, ',');
  if cols.first() == "rsid" {
    return Ok(None);
  }
  four_columns(&cols).map(Some)
}

/// `rsid \t chromosome \t position \t allele1 \t allele2`.
fn decode_ancestry(line: &str) -> Result<Option<Fields>> {
  let cols = Columns::split(SourceFormat::Ancestry, line, '\t');
  if cols.first() == "rsid" {
    return Ok(None);
  }
  let allele = format!("{}{}", cols.get(4)?, cols.get(5)?);
  Ok(Some(Fields::new(cols.get(0)?, cols.get(1)?, cols.get(3)?, allele)))
}

/// `Name,Variation,Chromosome,Position,Strand,YourCode`.
fn decode_decodeme(line: &str) -> Result<Option<Fields>> {
  let cols = Columns::split(SourceFormat::Decodeme, line, ',');
  if cols.first() == "name" {
    return Ok(None);
  }
  Ok(Some(Fields::new(
    cols.get(0)?,
    cols.get(2)?,
    cols.get(3)?,
    cols.get(5)?,
  )))
}

/// Single-sample VCF. The genotype is rebuilt from the `GT` subfield of the
/// sample column: index `0` names REF, `1` names ALT.
fn decode_exome_vcf(line: &str) -> Result<Option<Fields>> {
  let cols = Columns::split(SourceFormat::TwentyThreeAndMeExomeVcf, line, '\t');

  let gt_index = cols
    .get(8)?
    .split(':')
    .position(|key| key.eq_ignore_ascii_case("gt"))
    .ok_or_else(|| cols.malformed("FORMAT column has no GT key"))?;

  let genotype = cols
    .get(9)?
    .split(':')
    .nth(gt_index)
    .ok_or_else(|| cols.malformed("sample column has no GT subfield"))?;

  let reference = cols.get(3)?;
  let alternate = cols.get(4)?;
  let allele: String = genotype
    .split('/')
    .filter_map(|index| match index {
      "0" => Some(reference),
      "1" => Some(alternate),
      _ => None,
    })
    .collect();

  Ok(Some(Fields::new(
    cols.get(2)?.to_lowercase(),
    cols.get(0)?,
    cols.get(1)?,
    allele,
  )))
}

/// `name \t genotype`. Mitochondrial markers carry their position in the
/// name; everything else is filed under chromosome 1, position 1.
fn decode_iyg(line: &str) -> Result<Option<Fields>> {
  let cols = Columns::split(SourceFormat::Iyg, line, '\t');
  let name = cols.get(0)?;
  let allele = cols.get(1)?;

  let is_mitochondrial = name
    .get(..2)
    .is_some_and(|prefix| prefix.eq_ignore_ascii_case("mt"));
  if !is_mitochondrial {
    return Ok(Some(Fields::new(name, "1", "1", allele)));
  }

  let position: String =
    name.chars().filter(|c| !c.is_ascii_alphabetic()).collect();
  let name = alias::canonical_id(name).unwrap_or(name);
  Ok(Some(Fields::new(name, "MT", position, allele)))
}

fn four_columns(cols: &Columns<'_>) -> Result<Fields> {
  Ok(Fields::new(
    cols.get(0)?,
    cols.get(1)?,
    cols.get(2)?,
    cols.get(3)?,
  ))
}
