//! Vote toggling and setlist ranking.
//!
//! Both functions are pure: they never touch the store and give the same
//! answer for the same input.

use std::cmp::Ordering;

use crate::domain::song::Song;
use crate::domain::votes::{VoteTally, VoterSet};

/// Flips `actor`'s membership in `current_votes`.
///
/// A member who already voted has their vote retracted; anyone else has a
/// vote cast at the end of the list. The count in the returned tally is the
/// size of the new set, so applying the same toggle twice restores the
/// original set and count.
///
/// `actor` is not checked against any roster here.
pub fn toggle_vote(current_votes: &VoterSet, actor: &str) -> VoteTally {
  let mut votes = current_votes.clone();
  if !votes.remove(actor) {
    votes.insert(actor);
  }
  VoteTally::from_votes(votes)
}

/// Presentation order of two songs: more votes first, then title in
/// byte-wise ascending order, then id.
///
/// Byte-wise title comparison is what SQLite's default collation does, so a
/// list the store already sorted comes back unchanged.
pub fn rank_order(a: &Song, b: &Song) -> Ordering {
  b.total_votes()
    .cmp(&a.total_votes())
    .then_with(|| a.title.as_bytes().cmp(b.title.as_bytes()))
    .then_with(|| a.id.cmp(&b.id))
}

/// Sorts songs into setlist order. See [`rank_order`].
pub fn rank(mut songs: Vec<Song>) -> Vec<Song> {
  songs.sort_by(rank_order);
  songs
}
