use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use setlist_config::SetlistPaths;
use setlist_core::domain::{Song, SongDraft, SongId};
use setlist_core::ports::{SongChange, SongStore, SongUpdate, StoreError};

use crate::config::StorageConfig;
use crate::models::{SongRow, encode_votes, row_to_song, song_to_new_row};
use crate::schema::songs;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const CHANGE_FEED_CAPACITY: usize = 64;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every pooled connection.
#[derive(Debug)]
struct ConnectionOptions {
  journal_mode: String,
  busy_timeout_ms: u64,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    // busy_timeout first: switching to WAL needs a lock other connections may hold.
    conn
      .batch_execute(&format!(
        "PRAGMA busy_timeout = {}; PRAGMA journal_mode = {};",
        self.busy_timeout_ms, self.journal_mode
      ))
      .map_err(diesel::r2d2::Error::QueryError)
  }
}

/// [`SongStore`] backed by a local SQLite file.
///
/// Local writes are announced on the change feed as soon as they commit.
/// Writes from other processes sharing the file are only noticed while a
/// poller started with [`spawn_change_poller`](Self::spawn_change_poller)
/// is running.
pub struct SqliteSongStore {
  pool: SqlitePool,
  database_url: String,
  poll_interval: Duration,
  changes: broadcast::Sender<SongChange>,
}

impl SqliteSongStore {
  /// Opens the database configured in `[storage]` and applies pending migrations.
  pub fn open(config: &StorageConfig, paths: &SetlistPaths) -> Result<Self, StoreError> {
    Self::open_path(&config.database_path(paths), config)
  }

  pub fn open_path(path: &Path, config: &StorageConfig) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable(format!("{}: {e}", parent.display())))?;
    }

    let database_url = path.to_string_lossy().into_owned();
    let options = ConnectionOptions {
      journal_mode: config.journal_mode.to_ascii_uppercase(),
      busy_timeout_ms: config.busy_timeout_ms,
    };

    let pool = Pool::builder()
      .max_size(config.max_connections)
      .connection_customizer(Box::new(options))
      .build(ConnectionManager::<SqliteConnection>::new(&database_url))
      .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    {
      let mut pooled = pool.get().map_err(|e| StoreError::Unavailable(e.to_string()))?;
      let conn: &mut SqliteConnection = &mut pooled;
      let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| StoreError::Backend(e.to_string()))?;
      for version in applied {
        info!(%version, "applied migration");
      }
    }

    let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
    debug!(db = %database_url, "song store opened");

    Ok(Self { pool, database_url, poll_interval: config.poll_interval(), changes })
  }

  /// Runs blocking diesel work on a pooled connection.
  async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
  where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
  {
    let pool = self.pool.clone();
    tokio::task::spawn_blocking(move || {
      let mut conn = pool.get().map_err(|e| StoreError::Unavailable(e.to_string()))?;
      f(&mut conn)
    })
    .await
    .map_err(|e| StoreError::Backend(format!("blocking task failed: {e}")))?
  }

  fn publish(&self, change: SongChange) {
    // No subscribers is fine: nobody is watching.
    let _ = self.changes.send(change);
  }

  /// Starts watching the file for commits made through other connections
  /// (another `setlist` process, a manual `sqlite3` session) and announces
  /// them as [`SongChange::External`].
  ///
  /// Commits made through this store are seen too, so watchers may get an
  /// extra event for local writes.
  pub fn spawn_change_poller(&self) -> Result<JoinHandle<()>, StoreError> {
    let mut conn = SqliteConnection::establish(&self.database_url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
    let mut last_seen = data_version(&mut conn)?;
    let conn = Arc::new(Mutex::new(conn));
    let changes = self.changes.clone();
    let period = self.poll_interval;

    Ok(tokio::spawn(async move {
      let mut ticker = tokio::time::interval(period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

      loop {
        ticker.tick().await;

        let conn = Arc::clone(&conn);
        let polled = tokio::task::spawn_blocking(move || {
          let mut conn = conn.lock().map_err(|_| StoreError::Backend("poller connection poisoned".into()))?;
          data_version(&mut conn)
        })
        .await;

        match polled {
          Ok(Ok(version)) if version != last_seen => {
            debug!(version, "database changed on disk");
            last_seen = version;
            let _ = changes.send(SongChange::External);
          }
          Ok(Ok(_)) => {}
          Ok(Err(e)) => warn!(error = %e, "change poll failed"),
          Err(e) => {
            warn!(error = %e, "change poller stopped");
            return;
          }
        }
      }
    }))
  }
}

#[derive(QueryableByName)]
struct DataVersion {
  #[diesel(sql_type = BigInt)]
  data_version: i64,
}

fn data_version(conn: &mut SqliteConnection) -> Result<i64, StoreError> {
  diesel::sql_query("PRAGMA data_version")
    .get_result::<DataVersion>(conn)
    .map(|row| row.data_version)
    .map_err(backend_error)
}

fn backend_error(e: diesel::result::Error) -> StoreError {
  StoreError::Backend(e.to_string())
}

fn now() -> diesel::expression::SqlLiteral<Text> {
  sql::<Text>("CURRENT_TIMESTAMP")
}

#[async_trait]
impl SongStore for SqliteSongStore {
  async fn list(&self) -> Result<Vec<Song>, StoreError> {
    self
      .with_conn(|conn| {
        let rows = songs::table
          .order((songs::total_votes.desc(), songs::title.asc()))
          .select(SongRow::as_select())
          .load(conn)
          .map_err(backend_error)?;
        rows.into_iter().map(row_to_song).collect()
      })
      .await
  }

  async fn insert(&self, drafts: Vec<SongDraft>) -> Result<Vec<Song>, StoreError> {
    let created: Vec<Song> = drafts.into_iter().map(|d| Song::from_draft(SongId::new(), d)).collect();
    let rows = created.iter().map(song_to_new_row).collect::<Result<Vec<_>, _>>()?;

    self
      .with_conn(move |conn| {
        conn
          .transaction::<_, diesel::result::Error, _>(|conn| {
            for row in &rows {
              diesel::insert_into(songs::table).values(row).execute(conn)?;
            }
            Ok(())
          })
          .map_err(backend_error)
      })
      .await?;

    self.publish(SongChange::Inserted(created.iter().map(|s| s.id).collect()));
    Ok(created)
  }

  async fn update(&self, id: SongId, update: SongUpdate) -> Result<(), StoreError> {
    let key = id.to_string();

    let affected = self
      .with_conn(move |conn| {
        let target = songs::table.find(key);
        let affected = match update {
          SongUpdate::Key(song_key) => diesel::update(target)
            .set((songs::song_key.eq(song_key.map(|k| k.label())), songs::updated_at.eq(now())))
            .execute(conn),
          SongUpdate::Lead(lead) => {
            diesel::update(target).set((songs::lead.eq(lead), songs::updated_at.eq(now()))).execute(conn)
          }
          SongUpdate::Votes(tally) => {
            let (votes, total_votes) = tally.into_parts();
            let encoded = encode_votes(&votes)?;
            let total = i32::try_from(total_votes).map_err(|e| StoreError::Backend(e.to_string()))?;
            diesel::update(target)
              .set((songs::votes.eq(encoded), songs::total_votes.eq(total), songs::updated_at.eq(now())))
              .execute(conn)
          }
        };
        affected.map_err(backend_error)
      })
      .await?;

    if affected == 0 {
      return Err(StoreError::NotFound(id));
    }

    self.publish(SongChange::Updated(id));
    Ok(())
  }

  async fn remove(&self, id: SongId) -> Result<(), StoreError> {
    let key = id.to_string();
    let affected =
      self.with_conn(move |conn| diesel::delete(songs::table.find(key)).execute(conn).map_err(backend_error)).await?;

    if affected == 0 {
      return Err(StoreError::NotFound(id));
    }

    self.publish(SongChange::Removed(id));
    Ok(())
  }

  fn subscribe(&self) -> broadcast::Receiver<SongChange> {
    self.changes.subscribe()
  }
}
