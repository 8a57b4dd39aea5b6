// Hook: commit-msg / prepare-commit-msg
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::fs;

use clap::Parser;
use colored::Colorize;
use console::Emoji;
use thiserror::Error;

use crate::annotate::{Annotation, Annotator};
use crate::git::Repo;

const EMOJI: Emoji<'_, '_> = Emoji("🎫", "");

#[derive(Parser, Debug)]
#[clap(author, version, about = "Prefixes the commit message with the ticket from the branch name", long_about = None)]
pub struct Args {
  pub commit_msg_file: PathBuf,

  /// Message source, only passed by prepare-commit-msg
  #[clap(required = false)]
  pub commit_source: Option<String>,

  #[clap(required = false)]
  pub sha1: Option<String>
}

#[derive(Error, Debug)]
pub enum HookError {
  #[error("Failed to read commit message from {path}")]
  ReadCommitMessage {
    path:   PathBuf,
    #[source]
    source: io::Error
  },

  #[error("Failed to write commit message to {path}")]
  WriteCommitMessage {
    path:   PathBuf,
    #[source]
    source: io::Error
  },

  #[error(transparent)]
  Anyhow(#[from] anyhow::Error)
}

pub trait FilePath {
  fn read(&self) -> Result<String, HookError>;
  fn write(&self, msg: &str) -> Result<(), HookError>;
}

impl FilePath for Path {
  fn read(&self) -> Result<String, HookError> {
    fs::read_to_string(self).map_err(|source| HookError::ReadCommitMessage { path: self.to_path_buf(), source })
  }

  /// Writes next to the target and renames over it, so a failure never leaves
  /// a half written message behind.
  fn write(&self, msg: &str) -> Result<(), HookError> {
    let error = |source| HookError::WriteCommitMessage { path: self.to_path_buf(), source };

    let mut staging = OsString::from(self.as_os_str());
    staging.push(".git-ticket");
    let staging = PathBuf::from(staging);

    let result = fs::File::create(&staging)
      .and_then(|mut file| file.write_all(msg.as_bytes()).and_then(|_| file.sync_all()))
      .and_then(|_| fs::rename(&staging, self));

    if result.is_err() {
      fs::remove_file(&staging).ok();
    }

    result.map_err(error)
  }
}

/// Runs the hook against the repository git invoked it in.
pub fn run(args: &Args, annotator: &Annotator) -> Result<Annotation, HookError> {
  profile!("Run hook");
  log::debug!("Hook invoked with source {:?}", args.commit_source);

  let repo = Repo::from_env()?;
  annotate_file(&repo, &args.commit_msg_file, annotator)
}

/// Annotates the message file in place. Returns what was decided so callers can report it.
pub fn annotate_file(repo: &Repo, commit_msg_file: &Path, annotator: &Annotator) -> Result<Annotation, HookError> {
  let message = commit_msg_file.read()?;
  let branch = repo.current_branch()?;
  log::debug!("Annotating message for branch '{}'", branch);

  let comment_char = repo.comment_char();
  let annotation = if comment_char == annotator.comment_char() {
    annotator.annotate(&branch, &message)
  } else {
    annotator.clone().with_comment_char(comment_char).annotate(&branch, &message)
  };

  if annotation.applied() {
    commit_msg_file.write(&annotation.message)?;
    if let Some(ticket) = annotation.ticket() {
      println!("{EMOJI} Tagged commit with {} from branch {}", ticket.to_string().green(), branch.italic());
    }
  } else {
    log::debug!("Commit message left unchanged: {}", annotation.outcome);
  }

  Ok(annotation)
}
