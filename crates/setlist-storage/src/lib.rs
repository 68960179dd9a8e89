pub mod config;
pub mod models;
pub mod schema;
pub mod store;

pub use config::StorageConfig;
pub use store::{MIGRATIONS, SqliteSongStore};
