use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{MusicalKey, Song, SongDraft, SongId, VoteTally};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("song not found: {0}")]
  NotFound(SongId),

  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("corrupt record: {0}")]
  Corrupt(String),

  #[error("storage error: {0}")]
  Backend(String),
}

/// A partial update to one song. Title, attribution and id never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongUpdate {
  Key(Option<MusicalKey>),
  Lead(Option<String>),
  /// Writes the vote set and its count together.
  Votes(VoteTally),
}

/// Something happened to the song collection.
///
/// Receivers are not expected to apply these incrementally; any event means
/// "list again".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongChange {
  Inserted(Vec<SongId>),
  Updated(SongId),
  Removed(SongId),
  /// Another process changed the collection; details unknown.
  External,
}

/// Port over the persistence and change-notification backend.
///
/// Every method is a single attempt: adapters do not retry. Writes are last
/// write wins, there is no version check.
#[async_trait]
pub trait SongStore: Send + Sync {
  /// All songs, most votes first, then by title.
  async fn list(&self) -> Result<Vec<Song>, StoreError>;

  /// Stores the drafts, unvoted, and returns them with their new ids.
  /// Either all drafts are stored or none.
  async fn insert(&self, drafts: Vec<SongDraft>) -> Result<Vec<Song>, StoreError>;

  async fn update(&self, id: SongId, update: SongUpdate) -> Result<(), StoreError>;

  async fn remove(&self, id: SongId) -> Result<(), StoreError>;

  /// Subscribes to change events for the whole collection.
  fn subscribe(&self) -> broadcast::Receiver<SongChange>;
}
