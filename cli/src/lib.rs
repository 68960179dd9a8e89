mod config;
mod infrastructure;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::debug;

use setlist_config::{SetlistPaths, TomlConfigBackend};
use setlist_core::domain::{MusicalKey, Roster, Session, Song, SongDraft, SongId};
use setlist_core::services::SetlistService;
use setlist_storage::{SqliteSongStore, StorageConfig};

use crate::config::{SongDto, load_roster};
use crate::infrastructure::prompt::{TerminalConfirm, choose_member};
use crate::infrastructure::render::render_setlist;

type ConcreteSetlistService = SetlistService<SqliteSongStore>;

/// Vote on the band's setlist.
///
/// Songs are ranked by how many members voted for them, ties broken by
/// title. Configuration lives in `setlist.toml` (see `SETLIST_BASE_DIR`).
#[derive(Parser, Debug)]
#[command(name = "setlist", version, about, long_about = None)]
pub struct Cli {
  /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Band member to act as. Asked interactively when omitted on a terminal.
  #[arg(long = "as", env = "SETLIST_MEMBER", global = true, value_name = "NAME")]
  pub member: Option<String>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Show the band name, members and lead vocalists.
  Members,

  /// Print the ranked setlist.
  List {
    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
  },

  /// Add a single song.
  Add {
    title: String,
    /// Original artist.
    #[arg(long, default_value = "")]
    by: String,
    /// Musical key, e.g. `C`, `F#m`, `Bb`.
    #[arg(long)]
    key: Option<String>,
    /// Lead vocalist.
    #[arg(long)]
    lead: Option<String>,
  },

  /// Add songs from a list, one `Title - Artist` per line.
  BulkAdd {
    /// File to read; standard input when omitted.
    file: Option<PathBuf>,
  },

  /// Set a song's key, or clear it when KEY is omitted.
  Key { song: String, key: Option<String> },

  /// Set a song's lead vocalist, or clear it when NAME is omitted.
  Lead { song: String, name: Option<String> },

  /// Cast or retract your vote on a song.
  Vote { song: String },

  /// Remove a song from the setlist.
  Remove {
    song: String,
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
  },

  /// Show the setlist and keep it updated until Ctrl-C.
  Watch,
}

impl Commands {
  fn needs_member(&self) -> bool {
    !matches!(self, Commands::Members | Commands::List { .. })
  }
}

struct App {
  service: ConcreteSetlistService,
  session: Option<Session>,
}

impl App {
  fn open(cli: &Cli) -> Result<Self> {
    let paths = SetlistPaths::detect().context("resolving setlist directories")?;
    let backend = TomlConfigBackend::new(paths.clone());
    debug!(config = %backend.config_file().display(), "loading configuration");

    let roster = load_roster(&backend).context("loading [band] configuration")?;
    let storage = StorageConfig::load_from(&backend).context("loading [storage] configuration")?;
    let store = SqliteSongStore::open(&storage, &paths).context("opening song database")?;

    let session =
      if cli.command.needs_member() { Some(sign_in(&roster, cli.member.as_deref())?) } else { None };

    Ok(App { service: SetlistService::new(store, roster), session })
  }

  fn member(&self) -> Option<&str> {
    self.session.as_ref().map(Session::member)
  }

  fn session(&self) -> Result<&Session> {
    self.session.as_ref().ok_or_else(|| anyhow!("this command needs a signed-in member"))
  }

  async fn song(&self, query: &str) -> Result<Song> {
    let songs = self.service.refresh().await?;
    resolve_song(&songs, query).cloned()
  }

  fn print(&self, songs: &[Song]) {
    print!("{}", render_setlist(&self.service.roster().name, self.member(), songs));
  }
}

/// The name-selection gate.
fn sign_in(roster: &Roster, member: Option<&str>) -> Result<Session> {
  let name = match member {
    Some(name) => name.to_string(),
    None if io::stdin().is_terminal() => {
      let stdin = io::stdin();
      choose_member(roster, &mut stdin.lock(), &mut io::stderr())?
        .ok_or_else(|| anyhow!("no such member; choose one of: {}", roster.members.join(", ")))?
    }
    None => bail!("pick your name with --as <NAME> (one of: {})", roster.members.join(", ")),
  };
  Ok(roster.sign_in(&name)?)
}

/// Finds a song by full id or unique id prefix.
fn resolve_song<'a>(songs: &'a [Song], query: &str) -> Result<&'a Song> {
  if let Ok(id) = query.parse::<SongId>() {
    return songs.iter().find(|s| s.id == id).ok_or_else(|| anyhow!("no song with id {id}"));
  }

  let mut matches = songs.iter().filter(|s| s.id.matches_prefix(query));
  match (matches.next(), matches.next()) {
    (Some(song), None) => Ok(song),
    (Some(_), Some(_)) => bail!("id prefix {query:?} matches more than one song; type more of it"),
    (None, _) => bail!("no song with id starting {query:?}"),
  }
}

fn parse_key(key: Option<&str>) -> Result<Option<MusicalKey>> {
  MusicalKey::parse_optional(key.unwrap_or("")).with_context(|| {
    let labels: Vec<&str> = MusicalKey::ALL.iter().map(MusicalKey::label).collect();
    format!("valid keys are: {}", labels.join(" "))
  })
}

/// One-line message for a failed command, with its whole context chain.
pub fn error_message(err: &anyhow::Error) -> String {
  format!("setlist: {err:#}")
}

pub async fn run(cli: Cli) -> Result<()> {
  let app = App::open(&cli)?;
  let service = &app.service;

  match cli.command {
    Commands::Members => {
      let roster = service.roster();
      println!("{}", roster.name);
      println!("members:        {}", roster.members.join(", "));
      println!("lead vocalists: {}", roster.lead_vocalists.join(", "));
    }

    Commands::List { json } => {
      let songs = service.refresh().await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&SongDto::ranked(&songs))?);
      } else {
        app.print(&songs);
      }
    }

    Commands::Add { title, by, key, lead } => {
      let draft = SongDraft::new(title).by(by).key(parse_key(key.as_deref())?).lead(lead);
      let song = service.add_song(draft).await?;
      println!("Added \"{}\" ({})", song.title, song.id);
    }

    Commands::BulkAdd { file } => {
      let text = match &file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
          let mut text = String::new();
          io::stdin().read_to_string(&mut text).context("reading standard input")?;
          text
        }
      };
      let added = service.bulk_add(&text).await?;
      println!("Added {} song(s)", added.len());
    }

    Commands::Key { song, key } => {
      let key = parse_key(key.as_deref())?;
      let song = app.song(&song).await?;
      service.set_key(song.id, key).await?;
      match key {
        Some(key) => println!("\"{}\" is now in {key}", song.title),
        None => println!("Cleared key of \"{}\"", song.title),
      }
    }

    Commands::Lead { song, name } => {
      let song = app.song(&song).await?;
      service.set_lead(song.id, name.clone()).await?;
      match name.filter(|n| !n.trim().is_empty()) {
        Some(name) => println!("{} sings lead on \"{}\"", name.trim(), song.title),
        None => println!("Cleared lead of \"{}\"", song.title),
      }
    }

    Commands::Vote { song } => {
      let song = app.song(&song).await?;
      let session = app.session()?;
      let tally = service.toggle_vote(session, song.id).await?;
      let verb = if tally.votes().contains(session.member()) { "Voted for" } else { "Retracted vote on" };
      println!("{verb} \"{}\" ({} total)", song.title, tally.total_votes());
    }

    Commands::Remove { song, yes } => {
      let song = app.song(&song).await?;
      let removed = if yes {
        service.remove_song(song.id, &|_: &str| true).await?
      } else {
        service.remove_song(song.id, &TerminalConfirm).await?
      };
      if removed {
        println!("Removed \"{}\"", song.title);
      } else {
        println!("Kept \"{}\"", song.title);
      }
    }

    Commands::Watch => {
      let poller = service.store().spawn_change_poller()?;
      let watched = tokio::select! {
        result = service.watch(|songs| {
          // Clear the screen and home the cursor before each redraw.
          print!("\x1b[2J\x1b[H");
          app.print(songs);
        }) => result.map_err(anyhow::Error::from),
        signal = tokio::signal::ctrl_c() => signal.context("waiting for Ctrl-C"),
      };
      poller.abort();
      watched?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn songs() -> Vec<Song> {
    let ids = [
      "6f1c2a0e-1b2c-4d3e-8f40-123456789abc",
      "6f1d0000-0000-4000-8000-000000000000",
      "0b6e6f3c-6c43-4f43-9a0e-3f1f0a8a7c11",
    ];
    ids
      .iter()
      .zip(["Imagine", "Jolene", "Yesterday"])
      .map(|(id, title)| Song::from_draft(id.parse().unwrap(), SongDraft::new(title)))
      .collect()
  }

  #[test]
  fn cli_parse_vote_with_member() {
    let cli = Cli::try_parse_from(["setlist", "--as", "Jake", "vote", "6f1c"]).unwrap();
    assert_eq!(cli.member.as_deref(), Some("Jake"));
    assert!(matches!(cli.command, Commands::Vote { ref song } if song == "6f1c"));
    assert!(cli.command.needs_member());
  }

  #[test]
  fn cli_parse_add_with_options() {
    let args = ["setlist", "add", "Imagine", "--by", "John Lennon", "--key", "C", "--lead", "Jake"];
    let cli = Cli::try_parse_from(args).unwrap();
    match cli.command {
      Commands::Add { title, by, key, lead } => {
        assert_eq!(title, "Imagine");
        assert_eq!(by, "John Lennon");
        assert_eq!(key.as_deref(), Some("C"));
        assert_eq!(lead.as_deref(), Some("Jake"));
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn cli_parse_list_and_remove() {
    let cli = Cli::try_parse_from(["setlist", "-vv", "list", "--json"]).unwrap();
    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Commands::List { json: true }));
    assert!(!cli.command.needs_member());

    let cli = Cli::try_parse_from(["setlist", "remove", "0b6e", "-y"]).unwrap();
    assert!(matches!(cli.command, Commands::Remove { yes: true, .. }));

    let cli = Cli::try_parse_from(["setlist", "key", "0b6e"]).unwrap();
    assert!(matches!(cli.command, Commands::Key { key: None, .. }));
  }

  #[test]
  fn cli_rejects_missing_subcommand() {
    assert!(Cli::try_parse_from(["setlist"]).is_err());
  }

  #[test]
  fn resolves_full_ids_and_unique_prefixes() {
    let songs = songs();
    assert_eq!(resolve_song(&songs, "0b6e").unwrap().title, "Yesterday");
    assert_eq!(resolve_song(&songs, "6F1C2").unwrap().title, "Imagine");
    assert_eq!(resolve_song(&songs, "6f1c2a0e-1b2c-4d3e-8f40-123456789abc").unwrap().title, "Imagine");

    let err = resolve_song(&songs, "6f1").unwrap_err().to_string();
    assert!(err.contains("more than one"), "{err}");
    assert!(resolve_song(&songs, "ffff").is_err());
    assert!(resolve_song(&songs, "aa000000-0000-4000-8000-000000000000").is_err());
  }

  #[test]
  fn explicit_member_must_be_in_the_roster() {
    let roster = Roster::default();
    assert_eq!(sign_in(&roster, Some("Maria")).unwrap().member(), "Maria");
    assert!(sign_in(&roster, Some("Ringo")).is_err());
  }

  #[test]
  fn key_argument_parsing() {
    assert_eq!(parse_key(None).unwrap(), None);
    assert_eq!(parse_key(Some("F#m")).unwrap(), Some(MusicalKey::FSharpMinor));
    let err = parse_key(Some("H")).unwrap_err();
    assert!(format!("{err:#}").contains("valid keys are: C G D"));
  }

  #[test]
  fn error_message_shows_each_cause_once() {
    use setlist_core::CoreError;
    use setlist_core::ports::StoreError;

    let err = anyhow::Error::from(CoreError::Store(StoreError::Unavailable("database is locked".into())))
      .context("opening song database");
    assert_eq!(
      error_message(&err),
      "setlist: opening song database: store failure: store unavailable: database is locked"
    );
  }
}
