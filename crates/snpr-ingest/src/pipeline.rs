//! The ingest run: one upload, one file, one transaction.
//!
//! Lines are decoded and reconciled strictly in file order. Write operations
//! are buffered until end of file and handed to the store as a single batch,
//! so a failure anywhere leaves both catalogs untouched.

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use chrono::Utc;
use snpr_core::{
  reconcile::{CatalogSnapshot, Reconciler},
  store::GenomeStore,
  upload::{UploadDescriptor, UploadId},
  variant::WriteOp,
};
use snpr_formats::{SourceFormat, prepare_line};

use crate::{Error, Result};

// ─── Report ──────────────────────────────────────────────────────────────────

/// Summary of a committed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
  pub upload:                UploadDescriptor,
  pub format:                SourceFormat,
  pub lines_read:            usize,
  /// Comment and blank lines.
  pub lines_skipped:         usize,
  pub headers_skipped:       usize,
  pub records:               usize,
  pub variants_inserted:     usize,
  pub observations_inserted: usize,
  pub already_observed:      usize,
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Ingest the genotype file at `path` for upload `upload_id`.
pub fn ingest_file<S: GenomeStore>(
  store: &mut S,
  upload_id: UploadId,
  path: impl AsRef<Path>,
) -> Result<IngestReport> {
  let path = path.as_ref();
  tracing::info!(path = %path.display(), "opening genotype file");
  let file = File::open(path)?;
  ingest(store, upload_id, BufReader::new(file))
}

/// Ingest every line of `reader` for upload `upload_id`.
///
/// Loads the upload descriptor and both catalog snapshots, decodes and
/// reconciles each line, applies all resulting writes in one transaction and
/// then runs store maintenance.
pub fn ingest<S: GenomeStore>(
  store: &mut S,
  upload_id: UploadId,
  reader: impl BufRead,
) -> Result<IngestReport> {
  let upload = store
    .get_upload(upload_id)
    .map_err(Error::storage)?
    .ok_or(Error::NotFound(upload_id))?;
  let format =
    SourceFormat::from_vendor(&upload.source_format).map_err(Error::Format)?;
  tracing::info!(
    upload_id,
    user_id = upload.user_id,
    %format,
    "loaded genotype upload"
  );

  let snapshot = CatalogSnapshot::new(
    store.known_variants().map_err(Error::storage)?,
    upload.user_id,
    store
      .known_user_variants(upload.user_id)
      .map_err(Error::storage)?,
  );
  tracing::info!(
    variants = snapshot.variant_count(),
    observations = snapshot.observation_count(),
    "loaded catalog snapshots"
  );

  let mut report = IngestReport {
    upload: upload.clone(),
    format,
    lines_read: 0,
    lines_skipped: 0,
    headers_skipped: 0,
    records: 0,
    variants_inserted: 0,
    observations_inserted: 0,
    already_observed: 0,
  };
  let mut reconciler = Reconciler::new(upload, snapshot);
  let mut ops: Vec<WriteOp> = Vec::new();

  for (index, line) in reader.lines().enumerate() {
    let raw = line?;
    report.lines_read += 1;

    let Some(line) = prepare_line(&raw) else {
      report.lines_skipped += 1;
      continue;
    };

    let record = format.normalize(&line).map_err(|source| Error::Line {
      number: index + 1,
      source,
    })?;
    let Some(record) = record else {
      report.headers_skipped += 1;
      continue;
    };

    report.records += 1;
    ops.extend(reconciler.reconcile(record, Utc::now()));
  }

  tracing::info!(ops = ops.len(), "committing");
  let batch = store.apply(&ops).map_err(Error::storage)?;
  report.variants_inserted = batch.variants_inserted;
  report.observations_inserted = batch.observations_inserted;
  report.already_observed = batch.noops;

  tracing::info!("running catalog maintenance");
  store.maintain().map_err(Error::storage)?;

  Ok(report)
}

#[cfg(test)]
mod tests {
  use std::{
    collections::{HashMap, HashSet},
    io::Cursor,
  };

  use snpr_core::{
    store::AppliedBatch,
    upload::UserId,
    variant::{CatalogVariant, VariantRecord},
  };

  use super::*;

  // ── In-memory store double
  // ───────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("memory store failure: {0}")]
  struct MemoryError(&'static str);

  #[derive(Default)]
  struct MemoryStore {
    uploads:      HashMap<UploadId, UploadDescriptor>,
    variants:     HashSet<String>,
    observations: HashMap<(UserId, String), String>,
    commits:      usize,
    maintenance:  usize,
    fail_apply:   bool,
  }

  impl MemoryStore {
    fn with_upload(id: UploadId, user_id: UserId, format: &str) -> Self {
      let mut s = Self::default();
      s.uploads.insert(id, UploadDescriptor {
        id,
        user_id,
        source_format: format.into(),
      });
      s
    }
  }

  impl GenomeStore for MemoryStore {
    type Error = MemoryError;

    fn get_upload(
      &self,
      id: UploadId,
    ) -> Result<Option<UploadDescriptor>, MemoryError> {
      Ok(self.uploads.get(&id).cloned())
    }

    fn known_variants(&self) -> Result<HashSet<String>, MemoryError> {
      Ok(self.variants.clone())
    }

    fn known_user_variants(
      &self,
      user_id: UserId,
    ) -> Result<HashSet<String>, MemoryError> {
      Ok(
        self
          .observations
          .keys()
          .filter(|(u, _)| *u == user_id)
          .map(|(_, name)| name.clone())
          .collect(),
      )
    }

    fn apply(&mut self, ops: &[WriteOp]) -> Result<AppliedBatch, MemoryError> {
      if self.fail_apply {
        return Err(MemoryError("apply"));
      }
      // Stage into copies so a failing batch leaves nothing behind.
      let mut variants = self.variants.clone();
      let mut observations = self.observations.clone();
      let mut batch = AppliedBatch::default();
      for op in ops {
        match op {
          WriteOp::InsertGlobalVariant(v) => {
            if !variants.insert(v.name.clone()) {
              return Err(MemoryError("duplicate variant"));
            }
          }
          WriteOp::InsertUserObservation(o) => {
            let key = (o.user_id, o.variant_name.clone());
            if observations.insert(key, o.allele.clone()).is_some() {
              return Err(MemoryError("duplicate observation"));
            }
          }
          WriteOp::NoOp { .. } => {}
        }
        batch.record(op);
      }
      self.variants = variants;
      self.observations = observations;
      self.commits += 1;
      Ok(batch)
    }

    fn maintain(&mut self) -> Result<(), MemoryError> {
      self.maintenance += 1;
      Ok(())
    }
  }

  fn run(store: &mut MemoryStore, input: &str) -> Result<IngestReport> {
    ingest(store, 1, Cursor::new(input.to_owned()))
  }

  // ── Scenarios
  // ───────────────────────────────────────────────────────────

  #[test]
  fn known_and_new_variants_commit_once() {
    let mut s = MemoryStore::with_upload(1, 42, "23andme");
    s.variants.insert("rs3094315".into());

    let input = "# rsid\tchromosome\tposition\tgenotype\n\
                 rs3094315\t1\t752566\tAA\n\
                 rs12562034\t1\t768448\tGG\n";
    let report = run(&mut s, input).unwrap();

    assert_eq!(report.lines_read, 3);
    assert_eq!(report.lines_skipped, 1);
    assert_eq!(report.records, 2);
    assert_eq!(report.variants_inserted, 1);
    assert_eq!(report.observations_inserted, 2);
    assert_eq!(report.already_observed, 0);
    assert_eq!(s.commits, 1);
    assert_eq!(s.maintenance, 1);
    assert_eq!(s.observations[&(42, "rs12562034".to_string())], "GG");
  }

  #[test]
  fn repeated_variant_in_one_file_is_inserted_once() {
    let mut s = MemoryStore::with_upload(1, 42, "23andme");
    let input = "rs1\t1\t10\tAA\nrs1\t1\t10\tAG\n";

    let report = run(&mut s, input).unwrap();
    assert_eq!(report.variants_inserted, 1);
    assert_eq!(report.observations_inserted, 1);
    assert_eq!(report.already_observed, 1);
    assert_eq!(s.observations[&(42, "rs1".to_string())], "AA");
  }

  #[test]
  fn second_run_over_same_file_only_noops() {
    let mut s = MemoryStore::with_upload(1, 42, "23andme");
    let input = "rs1\t1\t10\tAA\nrs2\t2\t20\tCT\n";

    run(&mut s, input).unwrap();
    let report = run(&mut s, input).unwrap();

    assert_eq!(report.variants_inserted, 0);
    assert_eq!(report.observations_inserted, 0);
    assert_eq!(report.already_observed, 2);
    assert_eq!(s.commits, 2);
  }

  #[test]
  fn header_rows_are_counted_not_decoded() {
    let mut s = MemoryStore::with_upload(1, 42, "ancestry");
    let input = "#AncestryDNA raw data download\n\
                 rsid\tchromosome\tposition\tallele1\tallele2\n\
                 rs4477212\t1\tx\t82154\tT\tC\n";
    let report = run(&mut s, input).unwrap();

    assert_eq!(report.lines_skipped, 1);
    assert_eq!(report.headers_skipped, 1);
    assert_eq!(report.records, 1);
    assert_eq!(s.observations[&(42, "rs4477212".to_string())], "TC");
  }

  #[test]
  fn missing_upload_is_not_found() {
    let mut s = MemoryStore::default();
    let err = run(&mut s, "rs1\t1\t10\tAA\n").unwrap_err();
    assert!(matches!(err, Error::NotFound(1)));
    assert_eq!(s.commits, 0);
  }

  #[test]
  fn unknown_format_aborts_before_any_write() {
    let mut s = MemoryStore::with_upload(1, 42, "myheritage");
    let err = run(&mut s, "rs1\t1\t10\tAA\n").unwrap_err();
    assert!(matches!(
      err,
      Error::Format(snpr_formats::Error::UnknownFormat(_))
    ));
    assert_eq!(s.commits, 0);
    assert_eq!(s.maintenance, 0);
  }

  #[test]
  fn malformed_line_aborts_whole_run() {
    let mut s = MemoryStore::with_upload(1, 42, "23andme");
    let input = "rs1\t1\t10\tAA\nrs2\t1\n";

    let err = run(&mut s, input).unwrap_err();
    assert!(matches!(
      err,
      Error::Line {
        number: 2,
        source: snpr_formats::Error::MalformedLine { .. },
      }
    ));
    assert_eq!(s.commits, 0);
    assert!(s.variants.is_empty());
  }

  #[test]
  fn storage_failure_skips_maintenance() {
    let mut s = MemoryStore::with_upload(1, 42, "23andme");
    s.fail_apply = true;

    let err = run(&mut s, "rs1\t1\t10\tAA\n").unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(s.maintenance, 0);
  }

  #[test]
  fn rejected_batch_leaves_store_unchanged() {
    let mut s = MemoryStore::with_upload(1, 42, "23andme");
    let known = VariantRecord::new("rs1", "1", "10", "aa").unwrap();
    let ops = [
      WriteOp::InsertGlobalVariant(CatalogVariant::first_seen(&known, Utc::now())),
      WriteOp::InsertGlobalVariant(CatalogVariant::first_seen(&known, Utc::now())),
    ];

    assert!(s.apply(&ops).is_err());
    assert!(s.variants.is_empty());
    assert_eq!(s.commits, 0);
  }

  #[test]
  fn unknown_format_keeps_its_own_variant() {
    let mut s = MemoryStore::with_upload(1, 42, "23andme-v5");
    let err = run(&mut s, "rs1\t1\t10\tAA\n").unwrap_err();
    let Error::Format(source) = &err else {
      panic!("expected Error::Format, got {err:?}")
    };
    assert!(matches!(
      source,
      snpr_formats::Error::UnknownFormat(f) if f == "23andme-v5"
    ));
  }

  #[test]
  fn empty_file_still_commits_once() {
    let mut s = MemoryStore::with_upload(1, 42, "IYG");
    let report = run(&mut s, "").unwrap();
    assert_eq!(report.lines_read, 0);
    assert_eq!(s.commits, 1);
  }
}
