use serde::Serialize;
use setlist_config::{ConfigError, TomlConfigBackend};
use setlist_core::domain::{Roster, Song};

const BAND_SECTION: &str = "band";

/// Loads `[band]`, writing the default line-up back on first run.
pub fn load_roster(backend: &TomlConfigBackend) -> Result<Roster, ConfigError> {
  let roster: Roster = backend.load_or_init_section(BAND_SECTION)?;
  roster
    .validate()
    .map_err(|e| ConfigError::Invalid { section: BAND_SECTION.to_string(), reason: e.to_string() })?;
  Ok(roster)
}

/// One ranked song as printed by `list --json`.
#[derive(Debug, Serialize)]
pub struct SongDto {
  pub position: usize,
  pub id: String,
  pub title: String,
  pub by: String,
  pub key: String,
  pub lead: String,
  pub votes: Vec<String>,
  pub total_votes: u32,
}

impl SongDto {
  pub fn ranked(songs: &[Song]) -> Vec<SongDto> {
    songs.iter().enumerate().map(|(i, song)| SongDto::from_song(i + 1, song)).collect()
  }

  fn from_song(position: usize, song: &Song) -> Self {
    SongDto {
      position,
      id: song.id.to_string(),
      title: song.title.clone(),
      by: song.by.clone(),
      key: song.key.map(|k| k.to_string()).unwrap_or_default(),
      lead: song.lead.clone().unwrap_or_default(),
      votes: song.votes.as_slice().to_vec(),
      total_votes: song.total_votes(),
    }
  }
}
