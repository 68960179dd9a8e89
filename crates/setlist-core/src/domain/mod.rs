pub mod ids;
pub mod musical_key;
pub mod roster;
pub mod song;
pub mod votes;

pub use ids::SongId;
pub use musical_key::{KeyParseError, MusicalKey};
pub use roster::{Roster, Session};
pub use song::{Song, SongDraft};
pub use votes::{VoteTally, VoterSet};
