use crate::io::atomic_write_str;
use crate::paths::{ConfigError, SetlistPaths};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use toml_edit::{DocumentMut, Item};

/// Reads and writes named sections (`[band]`, `[storage]`, ...) of one
/// TOML file.
pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

pub struct TomlConfigBackend {
  paths: SetlistPaths,
}

impl TomlConfigBackend {
  pub fn new(paths: SetlistPaths) -> Self {
    Self { paths }
  }

  pub fn config_file(&self) -> PathBuf {
    self.paths.config_file()
  }

  /// Like [`ConfigBackend::load_section`], but a missing file or section
  /// yields `T::default()`.
  pub fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    let path = self.paths.config_file();
    let content = match fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Ok(T::default());
      }
      Err(e) => return Err(e.into()),
    };

    let toml_val: toml::Value = toml::from_str(&content)?;

    let Some(table) = toml_val.get(section) else {
      return Ok(T::default());
    };

    decode_section(section, table.clone())
  }

  /// Loads a section (defaulting when absent) and writes it back, so a
  /// fresh install ends up with a complete, editable file.
  pub fn load_or_init_section<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Serialize + Default,
  {
    let value: T = self.load_section_with_default(section)?;
    self.save_section(section, &value)?;
    Ok(value)
  }
}

fn decode_section<T: DeserializeOwned>(section: &str, table: toml::Value) -> Result<T, ConfigError> {
  table.try_into().map_err(|e| ConfigError::Invalid { section: section.to_string(), reason: e.to_string() })
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.paths.config_file();
    let content = fs::read_to_string(&path)?;
    let toml_val: toml::Value = toml::from_str(&content)?;

    let table = toml_val
      .get(section)
      .ok_or_else(|| ConfigError::Other(format!("missing section [{section}] in {:?}", path)))?;

    decode_section(section, table.clone())
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    let path = self.paths.config_file();

    // Edit the existing document so comments and layout elsewhere survive.
    let mut doc: DocumentMut = match fs::read_to_string(&path) {
      Ok(content) => {
        content.parse::<DocumentMut>().map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?
      }
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    let section_str =
      toml::to_string(value).map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;

    // `section_str` is a header-less table ("foo = 1\nbar = 2\n").
    let section_item: Item = section_str
      .parse::<DocumentMut>()
      .map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?
      .into_item();

    doc[section] = section_item;

    atomic_write_str(&path, &doc.to_string())?;
    tracing::debug!(section, path = %path.display(), "config section saved");

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
  struct Sample {
    name: String,
    #[serde(default)]
    size: u32,
  }

  fn backend() -> (tempfile::TempDir, TomlConfigBackend) {
    let tmp = tempfile::tempdir().unwrap();
    let paths = SetlistPaths::at(tmp.path()).unwrap();
    (tmp, TomlConfigBackend::new(paths))
  }

  #[test]
  fn missing_file_or_section_gives_default() {
    let (_tmp, backend) = backend();
    let sample: Sample = backend.load_section_with_default("sample").unwrap();
    assert_eq!(sample, Sample::default());

    fs::write(backend.config_file(), "[other]\nx = 1\n").unwrap();
    let sample: Sample = backend.load_section_with_default("sample").unwrap();
    assert_eq!(sample, Sample::default());
    assert!(matches!(backend.load_section::<Sample>("sample"), Err(ConfigError::Other(_))));
  }

  #[test]
  fn save_keeps_other_sections_and_comments() {
    let (_tmp, backend) = backend();
    fs::write(backend.config_file(), "# hand written\n[other]\nx = 1 # keep me\n").unwrap();

    backend.save_section("sample", &Sample { name: "Jolene".into(), size: 3 }).unwrap();

    let written = fs::read_to_string(backend.config_file()).unwrap();
    assert!(written.contains("# hand written"));
    assert!(written.contains("# keep me"));
    let sample: Sample = backend.load_section("sample").unwrap();
    assert_eq!(sample, Sample { name: "Jolene".into(), size: 3 });
  }

  #[test]
  fn load_or_init_writes_defaults_back() {
    let (_tmp, backend) = backend();
    let sample: Sample = backend.load_or_init_section("sample").unwrap();
    assert_eq!(sample, Sample::default());
    assert!(fs::read_to_string(backend.config_file()).unwrap().contains("[sample]"));
  }

  #[test]
  fn wrongly_typed_section_is_invalid() {
    let (_tmp, backend) = backend();
    fs::write(backend.config_file(), "[sample]\nname = 5\n").unwrap();
    let err = backend.load_section_with_default::<Sample>("sample").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { section, .. } if section == "sample"));
  }
}
