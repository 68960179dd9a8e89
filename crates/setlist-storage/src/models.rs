use crate::schema::songs;

use diesel::prelude::*;
use setlist_core::domain::{MusicalKey, Song, SongId, VoterSet};
use setlist_core::ports::StoreError;
use tracing::warn;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = songs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SongRow {
  pub id: String,
  pub title: String,
  pub artist: String,
  pub song_key: Option<String>,
  pub lead: Option<String>,
  pub votes: String,
  pub total_votes: i32,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = songs)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewSongRow {
  pub id: String,
  pub title: String,
  pub artist: String,
  pub song_key: Option<String>,
  pub lead: Option<String>,
  pub votes: String,
  pub total_votes: i32,
}

pub fn encode_votes(votes: &VoterSet) -> Result<String, StoreError> {
  serde_json::to_string(votes).map_err(|e| StoreError::Backend(format!("encode votes: {e}")))
}

pub fn song_to_new_row(song: &Song) -> Result<NewSongRow, StoreError> {
  Ok(NewSongRow {
    id: song.id.to_string(),
    title: song.title.clone(),
    artist: song.by.clone(),
    song_key: song.key.map(|k| k.label().to_string()),
    lead: song.lead.clone(),
    votes: encode_votes(&song.votes)?,
    total_votes: i32::try_from(song.total_votes()).map_err(|e| StoreError::Backend(e.to_string()))?,
  })
}

/// Converts a row back into a song.
///
/// The vote count is taken from the vote set. A row whose `total_votes`
/// column says otherwise (written by an older client that counted
/// separately) is logged and read with the derived count.
pub fn row_to_song(row: SongRow) -> Result<Song, StoreError> {
  let id: SongId = row.id.parse().map_err(|e| StoreError::Corrupt(format!("song id {:?}: {e}", row.id)))?;

  let key = MusicalKey::parse_optional(row.song_key.as_deref().unwrap_or(""))
    .map_err(|e| StoreError::Corrupt(format!("song {id}: {e}")))?;

  let votes: VoterSet =
    serde_json::from_str(&row.votes).map_err(|e| StoreError::Corrupt(format!("song {id} votes: {e}")))?;

  let song = Song {
    id,
    title: row.title,
    by: row.artist,
    key,
    lead: row.lead.filter(|l| !l.trim().is_empty()),
    votes,
  };

  if i64::from(row.total_votes) != i64::from(song.total_votes()) {
    warn!(
      %id,
      stored = row.total_votes,
      derived = song.total_votes(),
      "vote count out of sync with voters, using voters"
    );
  }

  Ok(song)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(votes: &str, total_votes: i32) -> SongRow {
    SongRow {
      id: "0b6e6f3c-6c43-4f43-9a0e-3f1f0a8a7c11".into(),
      title: "Valerie".into(),
      artist: "Amy Winehouse".into(),
      song_key: Some("Eb".into()),
      lead: Some(String::new()),
      votes: votes.into(),
      total_votes,
      created_at: "2026-01-01 00:00:00".into(),
      updated_at: "2026-01-01 00:00:00".into(),
    }
  }

  #[test]
  fn reads_a_well_formed_row() {
    let song = row_to_song(row(r#"["Jake","Maria"]"#, 2)).unwrap();
    assert_eq!(song.title, "Valerie");
    assert_eq!(song.by, "Amy Winehouse");
    assert_eq!(song.key, Some(MusicalKey::EFlat));
    assert_eq!(song.lead, None);
    assert_eq!(song.votes.as_slice(), ["Jake", "Maria"]);
  }

  #[test]
  fn drifted_count_is_derived_from_voters() {
    let song = row_to_song(row(r#"["Jake","Jake","Maria"]"#, 7)).unwrap();
    assert_eq!(song.total_votes(), 2);
  }

  #[test]
  fn garbage_is_reported_as_corrupt() {
    let mut bad_id = row("[]", 0);
    bad_id.id = "nope".into();
    assert!(matches!(row_to_song(bad_id), Err(StoreError::Corrupt(_))));

    let mut bad_key = row("[]", 0);
    bad_key.song_key = Some("H#".into());
    assert!(matches!(row_to_song(bad_key), Err(StoreError::Corrupt(_))));

    assert!(matches!(row_to_song(row("{", 0)), Err(StoreError::Corrupt(_))));
  }
}
