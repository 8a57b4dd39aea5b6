use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use ticket::config::App;
use ticket::git::Repo;

pub fn run(args: &ArgMatches) -> Result<()> {
  let message = args.get_one::<String>("message").cloned().unwrap_or_default();
  let branch = match args.get_one::<String>("branch") {
    Some(branch) => branch.clone(),
    None => Repo::new_with_path(".")?.current_branch()?
  };

  let annotation = App::new()?.annotator()?.annotate(&branch, &message);

  println!("{} {}", "branch: ".dimmed(), branch);
  println!("{} {}", "outcome:".dimmed(), annotation.outcome);
  println!("{} {}", "message:".dimmed(), annotation.message.green());

  Ok(())
}
