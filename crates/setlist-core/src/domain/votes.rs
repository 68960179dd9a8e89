use serde::{Deserialize, Serialize};

/// The members who voted for a song.
///
/// Behaves as a set (a member is in it at most once, equality ignores
/// order) but remembers the order in which votes were cast, which is the
/// order voters are listed in.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct VoterSet(Vec<String>);

impl VoterSet {
  pub fn new() -> Self {
    Self(Vec::new())
  }

  pub fn contains(&self, member: &str) -> bool {
    self.0.iter().any(|m| m == member)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  /// Voters in the order their votes were cast.
  pub fn as_slice(&self) -> &[String] {
    &self.0
  }

  /// Adds `member` at the end. Returns false if it was already present.
  pub(crate) fn insert(&mut self, member: &str) -> bool {
    if self.contains(member) {
      return false;
    }
    self.0.push(member.to_string());
    true
  }

  /// Returns false if `member` was not present.
  pub(crate) fn remove(&mut self, member: &str) -> bool {
    let before = self.0.len();
    self.0.retain(|m| m != member);
    self.0.len() != before
  }
}

impl PartialEq for VoterSet {
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len() && self.iter().all(|m| other.contains(m))
  }
}

/// Drops repeated names, keeping the first occurrence.
impl From<Vec<String>> for VoterSet {
  fn from(names: Vec<String>) -> Self {
    names.into_iter().collect()
  }
}

impl FromIterator<String> for VoterSet {
  fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
    let mut set = VoterSet::new();
    for name in iter {
      set.insert(&name);
    }
    set
  }
}

impl<'a> FromIterator<&'a str> for VoterSet {
  fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
    iter.into_iter().map(str::to_string).collect()
  }
}

impl From<VoterSet> for Vec<String> {
  fn from(set: VoterSet) -> Self {
    set.0
  }
}

/// A vote set together with its size, as written back to the store.
///
/// The count can only be derived from the set, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
  votes: VoterSet,
  total_votes: u32,
}

impl VoteTally {
  pub fn from_votes(votes: VoterSet) -> Self {
    let total_votes = u32::try_from(votes.len()).unwrap_or(u32::MAX);
    Self { votes, total_votes }
  }

  pub fn votes(&self) -> &VoterSet {
    &self.votes
  }

  pub fn total_votes(&self) -> u32 {
    self.total_votes
  }

  pub fn into_parts(self) -> (VoterSet, u32) {
    (self.votes, self.total_votes)
  }
}
