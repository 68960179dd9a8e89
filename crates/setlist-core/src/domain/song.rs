use crate::domain::ids::SongId;
use crate::domain::musical_key::MusicalKey;
use crate::domain::votes::VoterSet;

/// A votable entry on the setlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
  pub id: SongId,
  /// Never empty.
  pub title: String,
  /// Free-text attribution (original artist). Empty when unknown.
  pub by: String,
  pub key: Option<MusicalKey>,
  /// Member singing lead, if one has been picked.
  pub lead: Option<String>,
  pub votes: VoterSet,
}

impl Song {
  /// Builds the stored form of a freshly inserted draft: no votes yet.
  pub fn from_draft(id: SongId, draft: SongDraft) -> Self {
    Song { id, title: draft.title, by: draft.by, key: draft.key, lead: draft.lead, votes: VoterSet::new() }
  }

  /// Number of members who voted for this song. Always the size of `votes`.
  pub fn total_votes(&self) -> u32 {
    u32::try_from(self.votes.len()).unwrap_or(u32::MAX)
  }
}

/// A song that has not been stored yet.
///
/// Drafts carry no votes: every song enters the setlist unvoted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongDraft {
  pub title: String,
  pub by: String,
  pub key: Option<MusicalKey>,
  pub lead: Option<String>,
}

impl SongDraft {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Default::default() }
  }

  pub fn by(mut self, by: impl Into<String>) -> Self {
    self.by = by.into();
    self
  }

  pub fn key(mut self, key: Option<MusicalKey>) -> Self {
    self.key = key;
    self
  }

  pub fn lead(mut self, lead: Option<String>) -> Self {
    self.lead = lead;
    self
  }

  /// Trims the free-text fields and turns a blank lead into "no lead".
  pub fn normalized(self) -> Self {
    SongDraft {
      title: self.title.trim().to_string(),
      by: self.by.trim().to_string(),
      key: self.key,
      lead: self.lead.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_votes_counts_distinct_voters() {
    let mut song = Song::from_draft(SongId::new(), SongDraft::new("Africa").by("Toto"));
    assert_eq!(song.total_votes(), 0);

    song.votes = ["Jake", "Maria", "Jake"].into_iter().collect();
    assert_eq!(song.total_votes(), 2);
  }
}
