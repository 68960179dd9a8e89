use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a song in the setlist.
///
/// Assigned by the store when the song is inserted and never changed
/// afterwards. Only the store creates new ids; everything else parses or
/// copies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(Uuid);

impl SongId {
  /// Generates a fresh random id.
  pub fn new() -> Self {
    SongId(Uuid::new_v4())
  }

  /// Returns true when the hyphenated form of this id starts with `prefix`.
  ///
  /// Used by front ends that let people type only the first characters of an id.
  pub fn matches_prefix(&self, prefix: &str) -> bool {
    let prefix = prefix.trim().to_ascii_lowercase();
    !prefix.is_empty() && self.0.hyphenated().to_string().starts_with(&prefix)
  }
}

impl Default for SongId {
  fn default() -> Self {
    Self::new()
  }
}

impl FromStr for SongId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Uuid::parse_str(s.trim()).map(SongId)
  }
}

impl fmt::Display for SongId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}
