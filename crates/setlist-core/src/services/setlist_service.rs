use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, info, warn};

use crate::bulk::parse_bulk_list;
use crate::domain::{MusicalKey, Roster, Session, Song, SongDraft, SongId, VoteTally};
use crate::errors::CoreError;
use crate::ledger;
use crate::ports::{Confirm, SongStore, SongUpdate, StoreError};

/// Drives a [`SongStore`] for one client session.
///
/// Holds the last ranked list fetched from the store. That snapshot only
/// changes on [`refresh`](Self::refresh); mutations go to the store and are
/// seen locally once the store reports the change, never applied ahead of
/// confirmation.
pub struct SetlistService<S>
where
  S: SongStore,
{
  store: S,
  roster: Roster,
  songs: RwLock<Vec<Song>>,
}

impl<S> SetlistService<S>
where
  S: SongStore,
{
  pub fn new(store: S, roster: Roster) -> Self {
    Self { store, roster, songs: RwLock::new(Vec::new()) }
  }

  pub fn roster(&self) -> &Roster {
    &self.roster
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  // -------- QUERY (read) --------

  /// Re-lists the store and replaces the snapshot with the ranked result.
  ///
  /// On failure the previous snapshot is kept.
  pub async fn refresh(&self) -> Result<Vec<Song>, CoreError> {
    let listed = self.store.list().await.map_err(store_failure("fetching songs"))?;
    let ranked = ledger::rank(listed);
    *self.songs.write().await = ranked.clone();
    debug!(songs = ranked.len(), "setlist refreshed");
    Ok(ranked)
  }

  /// Last ranked snapshot.
  pub async fn songs(&self) -> Vec<Song> {
    self.songs.read().await.clone()
  }

  pub async fn find(&self, id: SongId) -> Option<Song> {
    self.songs.read().await.iter().find(|s| s.id == id).cloned()
  }

  // -------- COMMAND (write) --------

  pub async fn add_song(&self, draft: SongDraft) -> Result<Song, CoreError> {
    let draft = self.check_draft(draft.normalized())?;
    let title = draft.title.clone();

    let mut stored = self.store.insert(vec![draft]).await.map_err(store_failure("adding song"))?;
    let song = stored.pop().ok_or_else(|| CoreError::Store(StoreError::Backend("insert returned no song".into())))?;

    info!(id = %song.id, title = %title, "song added");
    Ok(song)
  }

  /// Adds every song in a pasted list at once. If the store rejects the
  /// batch, nothing is added.
  pub async fn bulk_add(&self, text: &str) -> Result<Vec<Song>, CoreError> {
    let drafts = parse_bulk_list(text);
    if drafts.is_empty() {
      debug!("bulk add with no songs, nothing to do");
      return Ok(Vec::new());
    }

    let count = drafts.len();
    let stored = self.store.insert(drafts).await.map_err(store_failure("bulk adding songs"))?;

    info!(count, "songs bulk added");
    Ok(stored)
  }

  pub async fn set_key(&self, id: SongId, key: Option<MusicalKey>) -> Result<(), CoreError> {
    self.store.update(id, SongUpdate::Key(key)).await.map_err(store_failure("updating song key"))?;
    info!(%id, key = key.map(|k| k.label()).unwrap_or(""), "song key changed");
    Ok(())
  }

  /// Assigns (or clears, with `None` or a blank name) the lead vocalist.
  pub async fn set_lead(&self, id: SongId, lead: Option<String>) -> Result<(), CoreError> {
    let lead = self.check_lead(lead)?;
    let shown = lead.clone().unwrap_or_default();
    self.store.update(id, SongUpdate::Lead(lead)).await.map_err(store_failure("updating song lead"))?;
    info!(%id, lead = %shown, "song lead changed");
    Ok(())
  }

  /// Casts or retracts the signed-in member's vote on a song.
  ///
  /// The new vote set is computed from the current snapshot and written
  /// back whole, so a concurrent toggle from another client between our
  /// last refresh and this write is lost (last write wins).
  pub async fn toggle_vote(&self, session: &Session, id: SongId) -> Result<VoteTally, CoreError> {
    let current = self.find(id).await.ok_or(CoreError::NotFound(id))?;
    let tally = ledger::toggle_vote(&current.votes, session.member());

    self.store.update(id, SongUpdate::Votes(tally.clone())).await.map_err(store_failure("updating votes"))?;

    info!(%id, member = session.member(), total_votes = tally.total_votes(), "vote toggled");
    Ok(tally)
  }

  /// Removes a song once `confirm` agrees. Returns false when declined,
  /// in which case the store is not called.
  pub async fn remove_song(&self, id: SongId, confirm: &impl Confirm) -> Result<bool, CoreError> {
    let song = self.find(id).await.ok_or(CoreError::NotFound(id))?;

    if !confirm.confirm(&format!("Are you sure you want to remove \"{}\"?", song.title)) {
      debug!(%id, "removal declined");
      return Ok(false);
    }

    self.store.remove(id).await.map_err(store_failure("removing song"))?;
    info!(%id, title = %song.title, "song removed");
    Ok(true)
  }

  // -------- LIVE --------

  /// Keeps the snapshot current until the store's change feed closes.
  ///
  /// `on_change` sees the ranked list once at start and again after every
  /// refresh. Events that pile up while a refresh runs are folded into the
  /// next one. A failed refresh is logged and the previous list stays.
  pub async fn watch<F>(&self, mut on_change: F) -> Result<(), CoreError>
  where
    F: FnMut(&[Song]) + Send,
  {
    let mut changes = self.store.subscribe();
    let songs = self.refresh().await?;
    on_change(&songs);

    loop {
      match changes.recv().await {
        Ok(change) => debug!(?change, "setlist changed"),
        Err(broadcast::error::RecvError::Lagged(skipped)) => warn!(skipped, "change feed lagged"),
        Err(broadcast::error::RecvError::Closed) => {
          debug!("change feed closed");
          return Ok(());
        }
      }

      loop {
        match changes.try_recv() {
          Ok(change) => debug!(?change, "setlist changed"),
          Err(broadcast::error::TryRecvError::Lagged(skipped)) => warn!(skipped, "change feed lagged"),
          Err(_) => break,
        }
      }

      if let Ok(songs) = self.refresh().await {
        on_change(&songs);
      }
    }
  }

  fn check_draft(&self, draft: SongDraft) -> Result<SongDraft, CoreError> {
    if draft.title.is_empty() {
      return Err(CoreError::EmptyTitle);
    }
    let lead = self.check_lead(draft.lead.clone())?;
    Ok(SongDraft { lead, ..draft })
  }

  fn check_lead(&self, lead: Option<String>) -> Result<Option<String>, CoreError> {
    match lead.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()) {
      Some(name) if !self.roster.is_lead_vocalist(&name) => Err(CoreError::UnknownLead(name)),
      other => Ok(other),
    }
  }
}

fn store_failure(action: &'static str) -> impl FnOnce(StoreError) -> CoreError {
  move |err| {
    error!(action, error = %err, "store call failed");
    CoreError::Store(err)
  }
}
