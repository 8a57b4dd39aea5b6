mod check;
mod install;
mod reinstall;
mod uninstall;

use anyhow::Result;
use dotenv::dotenv;
use clap::{Arg, ArgMatches, Command};
use ticket::config::{App, ConfigPaths};

fn cli() -> Command {
  Command::new("git-ticket")
    .about("A git extension that prefixes commit messages with the ticket from the branch name")
    .subcommand_required(true)
    .arg_required_else_help(true)
    .subcommand(Command::new("install").about("Installs the git-ticket hook"))
    .subcommand(Command::new("reinstall").about("Replaces any existing commit-msg hook with git-ticket"))
    .subcommand(Command::new("uninstall").about("Uninstalls the git-ticket hook"))
    .subcommand(
      Command::new("check")
        .about("Shows how a message would be annotated without touching any file")
        .arg(Arg::new("message").required(true))
        .arg(
          Arg::new("branch")
            .long("branch")
            .short('b')
            .help("Branch name to use instead of the current one")
        )
    )
    .subcommand(
      Command::new("config")
        .about("Sets or resets configuration options")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
          Command::new("set")
            .about("Sets a configuration option (patterns, skip-prefixes, format)")
            .arg(Arg::new("key").required(true))
            .arg(Arg::new("value").required(true))
        )
        .subcommand(Command::new("reset").about("Restores the default configuration"))
    )
}

fn config(args: &ArgMatches) -> Result<()> {
  let paths = ConfigPaths::new()?;

  match args.subcommand() {
    Some(("set", args)) => {
      let key = args.get_one::<String>("key").cloned().unwrap_or_default();
      let value = args.get_one::<String>("value").cloned().unwrap_or_default();
      App::load(&paths)?.update_and_save(&key, value, &paths)
    },
    Some(("reset", _)) => App::reset(&paths),
    _ => unreachable!("config requires a subcommand")
  }
}

fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let args = cli().get_matches();

  match args.subcommand() {
    Some(("install", _)) => install::run()?,
    Some(("reinstall", _)) => reinstall::run()?,
    Some(("uninstall", _)) => uninstall::run()?,
    Some(("check", args)) => check::run(args)?,
    Some(("config", args)) => config(args)?,
    _ => unreachable!("a subcommand is required")
  }

  Ok(())
}
