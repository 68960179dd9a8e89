use thiserror::Error;

use crate::domain::ids::SongId;
use crate::ports::StoreError;

/// Error type of the setlist core.
///
/// Front ends map it to user messages; store failures have already been
/// logged by the time they reach the caller.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("store failure")]
  Store(#[from] StoreError),

  #[error("song title must not be empty")]
  EmptyTitle,

  #[error("{0:?} is not a band member")]
  UnknownMember(String),

  #[error("{0:?} is not one of the lead vocalists")]
  UnknownLead(String),

  #[error("invalid roster: {0}")]
  InvalidRoster(String),

  #[error("song not found: {0}")]
  NotFound(SongId),
}
