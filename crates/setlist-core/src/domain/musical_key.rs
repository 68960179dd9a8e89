use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The keys a song can be assigned to.
///
/// The set is fixed and mirrors the key selector the band uses: twelve
/// common major keys followed by seven minor keys. "No key" is expressed as
/// `Option<MusicalKey>::None`, never as a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MusicalKey {
  C,
  G,
  D,
  A,
  E,
  B,
  FSharp,
  F,
  BFlat,
  EFlat,
  AFlat,
  AMinor,
  EMinor,
  BMinor,
  FSharpMinor,
  DMinor,
  GMinor,
  CMinor,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown musical key: {0:?}")]
pub struct KeyParseError(pub String);

impl MusicalKey {
  /// Every key, in selector order.
  pub const ALL: [MusicalKey; 18] = [
    MusicalKey::C,
    MusicalKey::G,
    MusicalKey::D,
    MusicalKey::A,
    MusicalKey::E,
    MusicalKey::B,
    MusicalKey::FSharp,
    MusicalKey::F,
    MusicalKey::BFlat,
    MusicalKey::EFlat,
    MusicalKey::AFlat,
    MusicalKey::AMinor,
    MusicalKey::EMinor,
    MusicalKey::BMinor,
    MusicalKey::FSharpMinor,
    MusicalKey::DMinor,
    MusicalKey::GMinor,
    MusicalKey::CMinor,
  ];

  /// Short label as shown in the selector (`"F#m"`, `"Bb"`, ...).
  pub fn label(&self) -> &'static str {
    match self {
      MusicalKey::C => "C",
      MusicalKey::G => "G",
      MusicalKey::D => "D",
      MusicalKey::A => "A",
      MusicalKey::E => "E",
      MusicalKey::B => "B",
      MusicalKey::FSharp => "F#",
      MusicalKey::F => "F",
      MusicalKey::BFlat => "Bb",
      MusicalKey::EFlat => "Eb",
      MusicalKey::AFlat => "Ab",
      MusicalKey::AMinor => "Am",
      MusicalKey::EMinor => "Em",
      MusicalKey::BMinor => "Bm",
      MusicalKey::FSharpMinor => "F#m",
      MusicalKey::DMinor => "Dm",
      MusicalKey::GMinor => "Gm",
      MusicalKey::CMinor => "Cm",
    }
  }

  /// Parses an optional key where an empty (or blank) label means "unset".
  ///
  /// This is the shape keys have in storage and in the selector, where the
  /// first entry is the empty string.
  pub fn parse_optional(s: &str) -> Result<Option<Self>, KeyParseError> {
    if s.trim().is_empty() { Ok(None) } else { s.parse().map(Some) }
  }
}

impl FromStr for MusicalKey {
  type Err = KeyParseError;

  /// Matches labels exactly after trimming. Case matters: `"Am"` is a key,
  /// `"AM"` is not, and `"a"` is not `"A"`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    MusicalKey::ALL
      .into_iter()
      .find(|k| k.label() == trimmed)
      .ok_or_else(|| KeyParseError(s.to_string()))
  }
}

impl TryFrom<String> for MusicalKey {
  type Error = KeyParseError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<MusicalKey> for String {
  fn from(key: MusicalKey) -> Self {
    key.label().to_string()
  }
}

impl fmt::Display for MusicalKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}
