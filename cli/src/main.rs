use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use setlist_lib::{Cli, error_message, run};

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();

  // RUST_LOG wins over -v when set.
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
    0 => EnvFilter::new("warn"),
    1 => EnvFilter::new("info"),
    2 => EnvFilter::new("debug"),
    _ => EnvFilter::new("trace"),
  });

  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      // Store failures already went through `error!` in the service.
      eprintln!("{}", error_message(&e));
      ExitCode::from(1)
    }
  }
}
