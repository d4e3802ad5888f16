//! snpr-ingest worker binary.
//!
//! Ingests one genotype upload per invocation. Reads `snpr.toml` (or the path
//! given with `--config`) and `SNPR_*` environment variables, opens the
//! SQLite catalog and processes the file named by `--temp-file`.
//!
//! ```
//! snpr-ingest --database catalog.sqlite3 --genotype-id 17 \
//!   --temp-file /tmp/genome_17.txt --root-path /srv/app
//! ```

use std::{
  fs::{self, OpenOptions},
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Mutex,
};

use anyhow::Context as _;
use clap::Parser;
use snpr_core::upload::UploadId;
use snpr_ingest::{IngestReport, IngestSettings, ingest_file};
use snpr_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Ingest a raw genotype export into the SNP catalogs")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "snpr.toml")]
  config: PathBuf,

  /// SQLite catalog database; overrides `database` from the config.
  #[arg(long)]
  database: Option<PathBuf>,

  /// ID of the genotype upload being parsed.
  #[arg(long)]
  genotype_id: UploadId,

  /// Path of the genotype file being parsed.
  #[arg(long)]
  temp_file: PathBuf,

  /// Root path of the host application; the log goes to `<root>/log/`.
  #[arg(long)]
  root_path: Option<PathBuf>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let settings = match IngestSettings::load(&cli.config)
    .map(|s| s.with_overrides(cli.database.clone(), cli.root_path.clone()))
    .and_then(|s| s.validate().map(|()| s))
  {
    Ok(settings) => settings,
    Err(e) => {
      eprintln!("error: {e}");
      return ExitCode::FAILURE;
    }
  };

  if let Err(e) = init_tracing(&settings) {
    eprintln!("error: {e:#}");
    return ExitCode::FAILURE;
  }

  tracing::info!(genotype_id = cli.genotype_id, "started worker");
  match run(&cli, &settings) {
    Ok(report) => {
      tracing::info!(
        lines = report.lines_read,
        records = report.records,
        variants_inserted = report.variants_inserted,
        observations_inserted = report.observations_inserted,
        already_observed = report.already_observed,
        "done"
      );
      ExitCode::SUCCESS
    }
    Err(e) => {
      tracing::error!("{e:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: &Cli, settings: &IngestSettings) -> anyhow::Result<IngestReport> {
  let database = settings.database()?;
  let mut store = SqliteStore::open(database)
    .with_context(|| format!("failed to open store at {database:?}"))?;
  tracing::info!(database = %database.display(), "connected");

  let report = ingest_file(&mut store, cli.genotype_id, &cli.temp_file)
    .with_context(|| format!("failed to ingest {:?}", cli.temp_file))?;
  Ok(report)
}

/// Log to `<root>/log/snp_parser.log` when a root path is configured,
/// otherwise to stderr.
fn init_tracing(settings: &IngestSettings) -> anyhow::Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match settings.log_file()? {
    Some(path) => {
      let file = open_log(&path)?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    }
  }
  Ok(())
}

fn open_log(path: &Path) -> anyhow::Result<fs::File> {
  if let Some(dir) = path.parent() {
    fs::create_dir_all(dir)
      .with_context(|| format!("failed to create log directory {dir:?}"))?;
  }
  OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("failed to open log file {path:?}"))
}
