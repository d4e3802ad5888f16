//! Reconciliation of normalised records against the two catalogs.
//!
//! Membership is decided against snapshot sets loaded once before the first
//! line is read. Each emitted insert is folded back into the snapshot right
//! away, so a variant repeated later in the same file never produces a
//! second insert for the same key.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::{
  upload::{UploadDescriptor, UserId},
  variant::{CatalogVariant, UserObservation, VariantRecord, WriteOp},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// In-memory view of which keys already exist in the catalogs.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
  variants:      HashSet<String>,
  user_variants: HashSet<(UserId, String)>,
}

impl CatalogSnapshot {
  /// Build a snapshot from the global name set and one user's name set.
  pub fn new(
    variants: HashSet<String>,
    user_id: UserId,
    user_variants: HashSet<String>,
  ) -> Self {
    Self {
      variants,
      user_variants: user_variants
        .into_iter()
        .map(|name| (user_id, name))
        .collect(),
    }
  }

  pub fn knows_variant(&self, name: &str) -> bool {
    self.variants.contains(name)
  }

  pub fn knows_observation(&self, user_id: UserId, name: &str) -> bool {
    self.user_variants.contains(&(user_id, name.to_owned()))
  }

  pub fn variant_count(&self) -> usize { self.variants.len() }

  pub fn observation_count(&self) -> usize { self.user_variants.len() }
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// Turns records into [`WriteOp`]s for a single upload.
#[derive(Debug, Clone)]
pub struct Reconciler {
  upload:   UploadDescriptor,
  snapshot: CatalogSnapshot,
}

impl Reconciler {
  pub fn new(upload: UploadDescriptor, snapshot: CatalogSnapshot) -> Self {
    Self { upload, snapshot }
  }

  pub fn snapshot(&self) -> &CatalogSnapshot { &self.snapshot }

  /// Decide what `record` means for the catalogs.
  ///
  /// Yields `InsertGlobalVariant` when the name is new to the global
  /// catalog, then either `InsertUserObservation` when the user has not seen
  /// it yet or `NoOp` when they have. An existing observation is never
  /// replaced, even if `record` carries a different allele.
  pub fn reconcile(
    &mut self,
    record: VariantRecord,
    now: DateTime<Utc>,
  ) -> Vec<WriteOp> {
    let mut ops = Vec::with_capacity(2);
    let user_id = self.upload.user_id;

    if !self.snapshot.knows_variant(record.variant_name()) {
      ops.push(WriteOp::InsertGlobalVariant(CatalogVariant::first_seen(
        &record, now,
      )));
      self
        .snapshot
        .variants
        .insert(record.variant_name().to_owned());
    }

    if self.snapshot.knows_observation(user_id, record.variant_name()) {
      tracing::debug!(
        variant = record.variant_name(),
        allele = record.allele(),
        user_id,
        "user already has an observation for this variant"
      );
      ops.push(WriteOp::NoOp {
        user_id,
        variant_name: record.variant_name().to_owned(),
        allele: record.allele().to_owned(),
      });
    } else {
      self
        .snapshot
        .user_variants
        .insert((user_id, record.variant_name().to_owned()));
      ops.push(WriteOp::InsertUserObservation(UserObservation {
        user_id,
        genotype_id: self.upload.id,
        variant_name: record.variant_name().to_owned(),
        allele: record.allele().to_owned(),
        created_at: now,
        updated_at: now,
      }));
    }

    ops
  }
}

#[cfg(test)]
mod tests {
  use std::borrow::Cow;

  use chrono::TimeZone;

  use super::*;
  use crate::variant::{
    ALLELE_FREQUENCY_PLACEHOLDER, DEFAULT_RANKING, GENOTYPE_FREQUENCY_PLACEHOLDER,
  };

  fn upload() -> UploadDescriptor {
    UploadDescriptor {
      id:            7,
      user_id:       42,
      source_format: "23andme".into(),
    }
  }

  fn record(name: &str, allele: &str) -> VariantRecord {
    VariantRecord::new(name, "1", "82154", allele).unwrap()
  }

  fn now() -> DateTime<Utc> { Utc.timestamp_opt(1_700_000_000, 0).unwrap() }

  fn names(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn unknown_variant_inserts_both_rows() {
    let mut r = Reconciler::new(upload(), CatalogSnapshot::default());
    let ops = r.reconcile(record("rs4477212", "aa"), now());

    assert_eq!(ops.len(), 2);
    let WriteOp::InsertGlobalVariant(v) = &ops[0] else {
      panic!("expected InsertGlobalVariant, got {:?}", ops[0])
    };
    assert_eq!(v.name, "rs4477212");
    assert_eq!(v.ranking, DEFAULT_RANKING);
    assert_eq!(v.allele_frequency, ALLELE_FREQUENCY_PLACEHOLDER);
    assert_eq!(v.genotype_frequency, GENOTYPE_FREQUENCY_PLACEHOLDER);
    assert_eq!(v.observation_count, 1);
    assert!(matches!(v.ranking, Cow::Borrowed(_)));
    assert!(matches!(v.allele_frequency, Cow::Borrowed(_)));
    assert!(matches!(v.genotype_frequency, Cow::Borrowed(_)));
    assert_eq!(v.created_at, now());
    assert_eq!(v.updated_at, now());

    let WriteOp::InsertUserObservation(o) = &ops[1] else {
      panic!("expected InsertUserObservation, got {:?}", ops[1])
    };
    assert_eq!(o.user_id, 42);
    assert_eq!(o.genotype_id, 7);
    assert_eq!(o.allele, "AA");
  }

  #[test]
  fn known_variant_only_inserts_observation() {
    let snapshot = CatalogSnapshot::new(names(&["rs123"]), 42, HashSet::new());
    let mut r = Reconciler::new(upload(), snapshot);
    let ops = r.reconcile(record("rs123", "ag"), now());

    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], WriteOp::InsertUserObservation(_)));
  }

  #[test]
  fn observed_variant_is_noop() {
    let snapshot =
      CatalogSnapshot::new(names(&["rs123"]), 42, names(&["rs123"]));
    let mut r = Reconciler::new(upload(), snapshot);
    let ops = r.reconcile(record("rs123", "ag"), now());

    assert_eq!(ops, vec![WriteOp::NoOp {
      user_id:      42,
      variant_name: "rs123".into(),
      allele:       "AG".into(),
    }]);
  }

  #[test]
  fn observation_of_other_user_does_not_count() {
    let snapshot =
      CatalogSnapshot::new(names(&["rs123"]), 99, names(&["rs123"]));
    let mut r = Reconciler::new(upload(), snapshot);
    let ops = r.reconcile(record("rs123", "ag"), now());

    assert!(matches!(ops[..], [WriteOp::InsertUserObservation(_)]));
  }

  #[test]
  fn reconciling_twice_is_idempotent() {
    let mut r = Reconciler::new(upload(), CatalogSnapshot::default());

    let first = r.reconcile(record("rs9", "cc"), now());
    assert!(matches!(
      first[..],
      [WriteOp::InsertGlobalVariant(_), WriteOp::InsertUserObservation(_)]
    ));

    let second = r.reconcile(record("rs9", "cc"), now());
    assert!(matches!(second[..], [WriteOp::NoOp { .. }]));

    assert!(r.snapshot().knows_variant("rs9"));
    assert!(r.snapshot().knows_observation(42, "rs9"));
  }

  #[test]
  fn first_allele_wins_on_reobservation() {
    let mut r = Reconciler::new(upload(), CatalogSnapshot::default());
    r.reconcile(record("rs9", "cc"), now());

    let ops = r.reconcile(record("rs9", "ct"), now());
    assert!(matches!(
      &ops[..],
      [WriteOp::NoOp { allele, .. }] if allele == "CT"
    ));
  }

  #[test]
  fn empty_name_is_rejected() {
    assert!(matches!(
      VariantRecord::new("", "1", "1", "a"),
      Err(crate::Error::EmptyVariantName)
    ));
  }
}
