#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use tempfile::TempDir;
use ticket::git::Repo;

pub struct TestRepo {
  pub repo:      git2::Repository,
  pub repo_path: TempDir
}

impl Default for TestRepo {
  fn default() -> Self {
    let repo_path = TempDir::new().unwrap();
    let repo = git2::Repository::init(repo_path.path()).unwrap();

    Self { repo, repo_path }
  }
}

impl TestRepo {
  pub fn path(&self) -> &Path {
    self.repo_path.path()
  }

  pub fn open(&self) -> Repo {
    Repo::new_with_path(self.path()).unwrap()
  }

  /// Points HEAD at a branch that has no commits yet.
  pub fn checkout_unborn(&self, branch: &str) -> Result<()> {
    self.repo.set_head(&format!("refs/heads/{branch}"))?;
    Ok(())
  }

  /// Commits the current index and creates `branch` on top of it.
  pub fn checkout(&self, branch: &str) -> Result<()> {
    let oid = self.commit("Initial commit")?;
    let commit = self.repo.find_commit(oid)?;
    self.repo.branch(branch, &commit, true)?;
    self.repo.set_head(&format!("refs/heads/{branch}"))?;
    Ok(())
  }

  pub fn detach(&self) -> Result<()> {
    let oid = self.commit("Initial commit")?;
    self.repo.set_head_detached(oid)?;
    Ok(())
  }

  pub fn commit(&self, message: &str) -> Result<git2::Oid> {
    let mut index = self.repo.index()?;
    let oid = index.write_tree()?;
    let signature = git2::Signature::now("Your Name", "email@example.com")?;
    let tree = self.repo.find_tree(oid)?;

    let oid = match self.repo.head().ok().and_then(|head| head.peel_to_commit().ok()) {
      Some(parent) => self.repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?,
      None => self.repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?
    };

    Ok(oid)
  }

  pub fn message_file(&self, content: &str) -> Result<PathBuf> {
    let path = self.repo.path().join("COMMIT_EDITMSG");
    std::fs::write(&path, content)?;
    Ok(path)
  }

  /// Runs the git CLI inside the repository with a throwaway home directory.
  pub fn git(&self, args: &[&str]) -> std::process::Output {
    Command::new("git")
      .args(["-c", "user.name=Your Name", "-c", "user.email=email@example.com"])
      .args(args)
      .current_dir(self.path())
      .env("HOME", self.path())
      .env("XDG_CONFIG_HOME", self.path())
      .env_remove("GIT_DIR")
      .env_remove("GIT_EDITOR")
      .env_remove("VISUAL")
      .env_remove("EDITOR")
      .output()
      .expect("Failed to execute git")
  }
}
