use serde::{Deserialize, Serialize};
use setlist_config::{ConfigError, SetlistPaths, TomlConfigBackend};
use std::path::PathBuf;
use std::time::Duration;

const SECTION: &str = "storage";
const JOURNAL_MODES: [&str; 6] = ["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
  /// Database file. Relative paths are taken from the data directory;
  /// unset means `<data_dir>/setlist.db`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub db_path: Option<PathBuf>,

  #[serde(default = "default_journal_mode")]
  pub journal_mode: String,

  /// How long a writer waits on a locked database before failing.
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u64,

  /// How often `watch` checks for changes made by other processes.
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms: u64,

  #[serde(default = "default_max_connections")]
  pub max_connections: u32,
}

fn default_journal_mode() -> String {
  "WAL".to_string()
}

fn default_busy_timeout_ms() -> u64 {
  5_000
}

fn default_poll_interval_ms() -> u64 {
  500
}

fn default_max_connections() -> u32 {
  4
}

impl Default for StorageConfig {
  fn default() -> Self {
    StorageConfig {
      db_path: None,
      journal_mode: default_journal_mode(),
      busy_timeout_ms: default_busy_timeout_ms(),
      poll_interval_ms: default_poll_interval_ms(),
      max_connections: default_max_connections(),
    }
  }
}

impl StorageConfig {
  /// Loads `[storage]`, writing defaults back when missing.
  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg: StorageConfig = backend.load_or_init_section(SECTION)?;
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { section: SECTION.to_string(), reason };

    if !JOURNAL_MODES.contains(&self.journal_mode.to_ascii_uppercase().as_str()) {
      return Err(invalid(format!("journal_mode {:?} is not one of {}", self.journal_mode, JOURNAL_MODES.join(", "))));
    }
    if self.max_connections == 0 {
      return Err(invalid("max_connections must be at least 1".into()));
    }
    if self.poll_interval_ms == 0 {
      return Err(invalid("poll_interval_ms must be at least 1".into()));
    }
    Ok(())
  }

  pub fn database_path(&self, paths: &SetlistPaths) -> PathBuf {
    match &self.db_path {
      Some(p) if p.is_absolute() => p.clone(),
      Some(p) => paths.data_dir.join(p),
      None => paths.data_dir.join("setlist.db"),
    }
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_written_back_and_valid() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = SetlistPaths::at(tmp.path()).unwrap();
    let backend = TomlConfigBackend::new(paths.clone());

    let cfg = StorageConfig::load_from(&backend).unwrap();
    assert_eq!(cfg, StorageConfig::default());
    assert_eq!(cfg.database_path(&paths), paths.data_dir.join("setlist.db"));

    let written = std::fs::read_to_string(paths.config_file()).unwrap();
    assert!(written.contains("[storage]"));
    assert!(written.contains("journal_mode = \"WAL\""));
  }

  #[test]
  fn relative_db_path_lives_in_data_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = SetlistPaths::at(tmp.path()).unwrap();
    let cfg = StorageConfig { db_path: Some("band/gigs.db".into()), ..Default::default() };
    assert_eq!(cfg.database_path(&paths), paths.data_dir.join("band/gigs.db"));
  }

  #[test]
  fn rejects_unknown_journal_mode_and_zero_pool() {
    let cfg = StorageConfig { journal_mode: "WAL; DROP TABLE songs".into(), ..Default::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));

    let cfg = StorageConfig { max_connections: 0, ..Default::default() };
    assert!(cfg.validate().is_err());

    let cfg = StorageConfig { journal_mode: "delete".into(), ..Default::default() };
    cfg.validate().unwrap();
  }
}
