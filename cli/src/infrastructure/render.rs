use setlist_core::domain::Song;

/// Characters of the id shown next to each song; enough to select it.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(song: &Song) -> String {
  song.id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// Plain-text ranked setlist, one numbered block per song.
pub fn render_setlist(band: &str, member: Option<&str>, songs: &[Song]) -> String {
  let mut out = format!("{band} - Song List");
  if let Some(member) = member {
    out.push_str(&format!("  (signed in as {member})"));
  }
  out.push('\n');

  if songs.is_empty() {
    out.push_str("\nNo songs yet. Add one with `setlist add <TITLE>`.\n");
    return out;
  }

  let width = songs.len().to_string().len();
  for (i, song) in songs.iter().enumerate() {
    out.push('\n');
    out.push_str(&format!("{:>width$}. {}", i + 1, song.title));
    if !song.by.is_empty() {
      out.push_str(&format!(" - {}", song.by));
    }
    out.push_str(&format!("  [{}]\n", short_id(song)));

    let indent = " ".repeat(width + 2);
    let mut details = Vec::new();
    if let Some(key) = song.key {
      details.push(format!("key {key}"));
    }
    if let Some(lead) = &song.lead {
      details.push(format!("lead {lead}"));
    }
    details.push(vote_summary(song));
    out.push_str(&format!("{indent}{}\n", details.join(" | ")));
  }

  out
}

fn vote_summary(song: &Song) -> String {
  let total = song.total_votes();
  let noun = if total == 1 { "vote" } else { "votes" };
  if song.votes.is_empty() {
    format!("{total} {noun}")
  } else {
    format!("{total} {noun}: {}", song.votes.as_slice().join(", "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use setlist_core::domain::{MusicalKey, SongDraft, SongId};

  fn song(id: &str, draft: SongDraft, votes: &[&str]) -> Song {
    let mut song = Song::from_draft(id.parse::<SongId>().unwrap(), draft);
    song.votes = votes.iter().copied().collect();
    song
  }

  #[test]
  fn renders_ranked_blocks() {
    let songs = [
      song(
        "6f1c2a0e-1b2c-4d3e-8f40-123456789abc",
        SongDraft::new("Imagine").by("John Lennon").key(Some(MusicalKey::C)).lead(Some("Jake".into())),
        &["Jake", "Maria"],
      ),
      song("0b6e6f3c-6c43-4f43-9a0e-3f1f0a8a7c11", SongDraft::new("Yesterday"), &["Kamala"]),
      song("aa000000-0000-4000-8000-000000000000", SongDraft::new("Africa"), &[]),
    ];

    let text = render_setlist("Diamond Voices", Some("Jake"), &songs);
    assert_eq!(
      text,
      "Diamond Voices - Song List  (signed in as Jake)\n\
       \n\
       1. Imagine - John Lennon  [6f1c2a0e]\n   key C | lead Jake | 2 votes: Jake, Maria\n\
       \n\
       2. Yesterday  [0b6e6f3c]\n   1 vote: Kamala\n\
       \n\
       3. Africa  [aa000000]\n   0 votes\n"
    );
  }

  #[test]
  fn empty_setlist_hints_at_add() {
    let text = render_setlist("Diamond Voices", None, &[]);
    assert!(text.starts_with("Diamond Voices - Song List\n"));
    assert!(text.contains("setlist add"));
  }
}
