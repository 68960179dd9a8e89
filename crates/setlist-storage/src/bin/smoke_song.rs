use std::path::Path;

use setlist_core::domain::SongDraft;
use setlist_core::ledger::toggle_vote;
use setlist_core::ports::{SongStore, SongUpdate};
use setlist_storage::{SqliteSongStore, StorageConfig};

#[tokio::main]
async fn main() {
  let path = std::env::args().nth(1).unwrap_or_else(|| "setlist-smoke.db".to_string());
  let store =
    SqliteSongStore::open_path(Path::new(&path), &StorageConfig::default()).expect("failed to open store");

  let song = store
    .insert(vec![SongDraft::new("Test Song").by("Smoke Test")])
    .await
    .expect("failed to insert song")
    .remove(0);

  println!("Saved song with id = {}", song.id);

  let tally = toggle_vote(&song.votes, "Smoke Tester");
  store.update(song.id, SongUpdate::Votes(tally)).await.expect("failed to vote");

  for loaded in store.list().await.expect("failed to list songs") {
    println!("{} | {} | votes={} {:?}", loaded.id, loaded.title, loaded.total_votes(), loaded.votes.as_slice());
  }
}
