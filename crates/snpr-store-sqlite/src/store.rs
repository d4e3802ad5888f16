//! [`SqliteStore`] — the SQLite implementation of [`GenomeStore`].

use std::{collections::HashSet, path::Path};

use rusqlite::{Connection, OptionalExtension as _};

use snpr_core::{
  store::{AppliedBatch, GenomeStore},
  upload::{UploadDescriptor, UploadId, UserId},
  variant::{CatalogVariant, UserObservation, WriteOp},
};

use crate::{
  Error, Result,
  encode::{RawObservation, RawUpload, RawVariant, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The SNP catalogs backed by a single SQLite file.
///
/// The connection is closed when the store is dropped.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  /// Register a genotype upload for `user_id` and return its descriptor.
  ///
  /// The host application normally owns this table; this is how fixtures and
  /// fresh databases get an upload to ingest into.
  pub fn register_upload(
    &self,
    user_id: UserId,
    source_format: &str,
  ) -> Result<UploadDescriptor> {
    self.conn.execute(
      "INSERT INTO genotypes (user_id, filetype) VALUES (?1, ?2)",
      rusqlite::params![user_id, source_format],
    )?;
    Ok(UploadDescriptor {
      id: self.conn.last_insert_rowid(),
      user_id,
      source_format: source_format.to_owned(),
    })
  }

  /// Read a catalog variant back by name.
  pub fn get_variant(&self, name: &str) -> Result<Option<CatalogVariant>> {
    let raw = self
      .conn
      .query_row(
        "SELECT name, chromosome, position, ranking, allele_frequency,
                genotype_frequency, user_snps_count, created_at, updated_at
         FROM snps WHERE name = ?1",
        rusqlite::params![name],
        |row| {
          Ok(RawVariant {
            name:               row.get(0)?,
            chromosome:         row.get(1)?,
            position:           row.get(2)?,
            ranking:            row.get(3)?,
            allele_frequency:   row.get(4)?,
            genotype_frequency: row.get(5)?,
            user_snps_count:    row.get(6)?,
            created_at:         row.get(7)?,
            updated_at:         row.get(8)?,
          })
        },
      )
      .optional()?;

    raw.map(RawVariant::into_variant).transpose()
  }

  /// Read a user's observation of `name` back.
  pub fn get_observation(
    &self,
    user_id: UserId,
    name: &str,
  ) -> Result<Option<UserObservation>> {
    let raw = self
      .conn
      .query_row(
        "SELECT snp_name, user_id, genotype_id, local_genotype,
                created_at, updated_at
         FROM user_snps WHERE user_id = ?1 AND snp_name = ?2",
        rusqlite::params![user_id, name],
        |row| {
          Ok(RawObservation {
            snp_name:       row.get(0)?,
            user_id:        row.get(1)?,
            genotype_id:    row.get(2)?,
            local_genotype: row.get(3)?,
            created_at:     row.get(4)?,
            updated_at:     row.get(5)?,
          })
        },
      )
      .optional()?;

    raw.map(RawObservation::into_observation).transpose()
  }

  fn names(&self, sql: &str, params: impl rusqlite::Params) -> Result<HashSet<String>> {
    let mut stmt = self.conn.prepare(sql)?;
    let names = stmt
      .query_map(params, |row| row.get(0))?
      .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(names)
  }
}

fn insert_variant(tx: &rusqlite::Transaction<'_>, v: &CatalogVariant) -> Result<()> {
  tx.prepare_cached(
    "INSERT INTO snps (
       name, chromosome, position, ranking, allele_frequency,
       genotype_frequency, user_snps_count, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
  )?
  .execute(rusqlite::params![
    v.name,
    v.chromosome,
    v.position,
    v.ranking.as_ref(),
    v.allele_frequency.as_ref(),
    v.genotype_frequency.as_ref(),
    v.observation_count,
    encode_dt(v.created_at),
    encode_dt(v.updated_at),
  ])?;
  Ok(())
}

fn insert_observation(
  tx: &rusqlite::Transaction<'_>,
  o: &UserObservation,
) -> Result<()> {
  tx.prepare_cached(
    "INSERT INTO user_snps (
       local_genotype, genotype_id, user_id, created_at, updated_at, snp_name
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?
  .execute(rusqlite::params![
    o.allele,
    o.genotype_id,
    o.user_id,
    encode_dt(o.created_at),
    encode_dt(o.updated_at),
    o.variant_name,
  ])?;
  Ok(())
}

// ─── GenomeStore impl ────────────────────────────────────────────────────────

impl GenomeStore for SqliteStore {
  type Error = Error;

  fn get_upload(&self, id: UploadId) -> Result<Option<UploadDescriptor>> {
    let raw = self
      .conn
      .query_row(
        "SELECT id, user_id, filetype FROM genotypes WHERE id = ?1",
        rusqlite::params![id],
        |row| {
          Ok(RawUpload {
            id:       row.get(0)?,
            user_id:  row.get(1)?,
            filetype: row.get(2)?,
          })
        },
      )
      .optional()?;

    Ok(raw.map(RawUpload::into_upload))
  }

  fn known_variants(&self) -> Result<HashSet<String>> {
    self.names("SELECT name FROM snps", [])
  }

  fn known_user_variants(&self, user_id: UserId) -> Result<HashSet<String>> {
    self.names(
      "SELECT snp_name FROM user_snps WHERE user_id = ?1",
      rusqlite::params![user_id],
    )
  }

  fn apply(&mut self, ops: &[WriteOp]) -> Result<AppliedBatch> {
    let tx = self.conn.transaction()?;
    let mut batch = AppliedBatch::default();

    for op in ops {
      match op {
        WriteOp::InsertGlobalVariant(v) => insert_variant(&tx, v)?,
        WriteOp::InsertUserObservation(o) => insert_observation(&tx, o)?,
        WriteOp::NoOp { .. } => {}
      }
      batch.record(op);
    }

    // Dropping `tx` on an early return above rolls everything back.
    tx.commit()?;
    tracing::debug!(?batch, "transaction committed");
    Ok(batch)
  }

  fn maintain(&mut self) -> Result<()> {
    self
      .conn
      .execute_batch("ANALYZE snps; ANALYZE user_snps; VACUUM;")?;
    Ok(())
  }
}
