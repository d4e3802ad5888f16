//! Runtime settings, layered from an optional TOML file, `SNPR_*`
//! environment variables and command-line overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Name of the log file written under `<root_path>/log/`.
pub const LOG_FILE_NAME: &str = "snp_parser.log";

/// Settings deserialised from the config file and environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestSettings {
  /// Path of the SQLite catalog database.
  #[serde(default)]
  pub database:  Option<PathBuf>,
  /// Root directory of the host application; logs go to `<root>/log/`.
  #[serde(default)]
  pub root_path: Option<PathBuf>,
}

impl IngestSettings {
  /// Read `config_file` (if it exists) and `SNPR_*` environment variables.
  pub fn load(config_file: &Path) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(config_file).required(false))
      .add_source(config::Environment::with_prefix("SNPR"))
      .build()
      .and_then(|settings| settings.try_deserialize())
      .map_err(|e| Error::Config(format!("{}: {e}", config_file.display())))
  }

  /// Apply command-line values on top; `None` keeps the loaded value.
  pub fn with_overrides(
    mut self,
    database: Option<PathBuf>,
    root_path: Option<PathBuf>,
  ) -> Self {
    if database.is_some() {
      self.database = database;
    }
    if root_path.is_some() {
      self.root_path = root_path;
    }
    self
  }

  /// The catalog database path. Missing or empty is a configuration error.
  pub fn database(&self) -> Result<&Path> {
    match self.database.as_deref() {
      Some(path) if !path.as_os_str().is_empty() => Ok(path),
      _ => Err(Error::Config("no database path configured".into())),
    }
  }

  /// Where to write the run log, if a root path is configured.
  pub fn log_file(&self) -> Result<Option<PathBuf>> {
    match self.root_path.as_deref() {
      None => Ok(None),
      Some(root) if root.as_os_str().is_empty() => {
        Err(Error::Config("root path is empty".into()))
      }
      Some(root) => Ok(Some(root.join("log").join(LOG_FILE_NAME))),
    }
  }

  /// Check every setting a run needs before any work starts.
  pub fn validate(&self) -> Result<()> {
    self.database()?;
    self.log_file()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn reads_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "database = \"/var/lib/snpr/catalog.sqlite3\"").unwrap();
    writeln!(file, "root_path = \"/srv/app\"").unwrap();

    let settings = IngestSettings::load(file.path()).unwrap();
    assert_eq!(
      settings.database().unwrap(),
      Path::new("/var/lib/snpr/catalog.sqlite3")
    );
    assert_eq!(
      settings.log_file().unwrap(),
      Some(PathBuf::from("/srv/app/log/snp_parser.log"))
    );
  }

  #[test]
  fn missing_config_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = IngestSettings::load(&dir.path().join("absent.toml"));
    assert!(settings.is_ok());
  }

  #[test]
  fn command_line_overrides_file() {
    let settings = IngestSettings {
      database:  Some("from-file.sqlite3".into()),
      root_path: Some("/srv/app".into()),
    }
    .with_overrides(Some("from-cli.sqlite3".into()), None);

    assert_eq!(settings.database().unwrap(), Path::new("from-cli.sqlite3"));
    assert_eq!(settings.root_path.as_deref(), Some(Path::new("/srv/app")));
  }

  #[test]
  fn missing_database_is_config_error() {
    let err = IngestSettings::default().validate().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
  }

  #[test]
  fn empty_root_path_is_config_error() {
    let settings = IngestSettings {
      database:  Some("catalog.sqlite3".into()),
      root_path: Some(PathBuf::new()),
    };
    assert!(matches!(settings.validate(), Err(Error::Config(_))));
  }

  #[test]
  fn no_root_path_means_no_log_file() {
    let settings = IngestSettings {
      database:  Some("catalog.sqlite3".into()),
      root_path: None,
    };
    assert_eq!(settings.log_file().unwrap(), None);
  }
}
