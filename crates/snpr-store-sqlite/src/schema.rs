//! SQL schema for the SNP catalog store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Genotype uploads, registered by the host application.
CREATE TABLE IF NOT EXISTS genotypes (
    id        INTEGER PRIMARY KEY,
    user_id   INTEGER NOT NULL,
    filetype  TEXT NOT NULL       -- vendor format string, e.g. '23andme'
);

-- Global variant catalog. One row per distinct name, never deleted here.
CREATE TABLE IF NOT EXISTS snps (
    name               TEXT PRIMARY KEY,
    chromosome         TEXT NOT NULL,
    position           TEXT NOT NULL,
    ranking            TEXT NOT NULL DEFAULT '0',
    allele_frequency   TEXT NOT NULL,
    genotype_frequency TEXT NOT NULL,
    user_snps_count    INTEGER NOT NULL DEFAULT 1,
    created_at         TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at         TEXT NOT NULL
);

-- Per-user observations. First write wins.
CREATE TABLE IF NOT EXISTS user_snps (
    snp_name        TEXT NOT NULL,
    user_id         INTEGER NOT NULL,
    genotype_id     INTEGER NOT NULL REFERENCES genotypes(id),
    local_genotype  TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (user_id, snp_name)
);

CREATE INDEX IF NOT EXISTS user_snps_user_idx ON user_snps(user_id);

PRAGMA user_version = 1;
";
