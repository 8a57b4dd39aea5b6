// Hook: commit-msg

use anyhow::{Context, Result};
use clap::Parser;
use ticket::config::App;
use ticket::hook::Args;
use ticket::Profile;

fn main() -> Result<()> {
  env_logger::init();
  let _profile = Profile::new("git-ticket-hook");
  let args = Args::parse();

  let annotator = App::new()
    .and_then(|app| app.annotator())
    .context("Failed to load git-ticket configuration")?;

  ticket::hook::run(&args, &annotator)?;
  Ok(())
}
