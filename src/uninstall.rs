use anyhow::{bail, Result};
use colored::Colorize;
use ticket::filesystem::Filesystem;

pub fn run() -> Result<()> {
  let fs = Filesystem::new()?;
  let hook_bin = fs.hook_bin_path();
  let hook_file = fs.commit_msg_path()?;

  if !hook_file.exists() {
    bail!("Hook does not exist: {}", hook_file);
  }

  // Leave hooks installed by other tools alone
  if !hook_file.links_to(&hook_bin) {
    bail!("Hook at {} was not installed by git-ticket, remove it manually", hook_file);
  }

  hook_file.delete()?;
  println!("Hook uninstalled successfully from {}", hook_file.to_string().italic());

  Ok(())
}
