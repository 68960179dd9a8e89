pub mod confirm;
pub mod song_store;

pub use confirm::Confirm;
pub use song_store::{SongChange, SongStore, SongUpdate, StoreError};
