use std::path::{Path, PathBuf};
use std::{env, fs};
use std::os::unix::fs::symlink as symlink_unix;

use anyhow::{bail, Context, Result};
use git2::{Repository, RepositoryOpenFlags as Flags};

const ERR_CURRENT_DIR: &str = "Failed to get current directory";

/// Name of the hook binary shipped next to `git-ticket`.
pub const HOOK_BIN: &str = "git-ticket-hook";

/// Git hook the binary is installed as.
pub const HOOK_NAME: &str = "commit-msg";

/// Locations the installer works with: the hook binary and the repository's hooks directory.
#[derive(Debug, Clone)]
pub struct Filesystem {
  hook_bin_path:  PathBuf,
  git_hooks_path: PathBuf
}

/// A file in the filesystem.
#[derive(Debug, Clone)]
pub struct File {
  path: PathBuf
}

impl File {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// True for regular files and for symlinks, dangling ones included.
  pub fn exists(&self) -> bool {
    profile!("Check file exists");
    self.path.symlink_metadata().is_ok()
  }

  pub fn delete(&self) -> Result<()> {
    profile!("Delete file");
    log::debug!("Removing file at {}", self);
    fs::remove_file(&self.path).with_context(|| format!("Failed to remove file at {}", self))
  }

  /// Creates a symbolic link at this path pointing to `target`.
  pub fn symlink(&self, target: &File) -> Result<()> {
    profile!("Create symlink");
    log::debug!("Symlinking {} to {}", target, self);
    symlink_unix(&target.path, &self.path).with_context(|| format!("Failed to symlink {} to {}", target, self))
  }

  /// Whether this file is a symlink resolving to `target`.
  pub fn links_to(&self, target: &File) -> bool {
    match fs::read_link(&self.path) {
      Ok(link) => {
        let link = if link.is_relative() { self.parent().path.join(link) } else { link };
        match (link.canonicalize(), target.path.canonicalize()) {
          (Ok(a), Ok(b)) => a == b,
          _ => link == target.path
        }
      },
      Err(_) => false
    }
  }

  /// Path relative to the current directory.
  pub fn relative_path(&self) -> Result<Dir> {
    profile!("Get relative file path");
    let current_dir = env::current_dir().context(ERR_CURRENT_DIR)?;
    let relative = self
      .path
      .strip_prefix(&current_dir)
      .with_context(|| format!("Failed to strip prefix from {}", self.path.display()))?;

    Ok(Dir::new(relative.to_path_buf()))
  }

  pub fn parent(&self) -> Dir {
    Dir::new(self.path.parent().unwrap_or(Path::new("")).to_path_buf())
  }
}

impl std::fmt::Display for File {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.relative_path() {
      Ok(relative) => write!(f, "{}", relative.path.display()),
      Err(_) => write!(f, "{}", self.path.display())
    }
  }
}

/// A directory in the filesystem.
#[derive(Debug, Clone)]
pub struct Dir {
  path: PathBuf
}

impl Dir {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub fn exists(&self) -> bool {
    profile!("Check directory exists");
    self.path.exists()
  }

  /// Creates the directory and all of its parents.
  pub fn create_dir_all(&self) -> Result<()> {
    profile!("Create directory recursively");
    log::debug!("Creating directory at {}", self);
    fs::create_dir_all(&self.path).with_context(|| format!("Failed to create directory at {}", self))
  }
}

impl std::fmt::Display for Dir {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.path.display())
  }
}

impl Filesystem {
  /// Resolves paths for the repository containing the current directory,
  /// expecting the hook binary next to the running executable.
  pub fn new() -> Result<Self> {
    profile!("Initialize filesystem");

    let current_dir = env::current_dir().context(ERR_CURRENT_DIR)?;
    let bin_path = env::current_exe().context("Failed to get current executable")?;
    let bin_dir = bin_path
      .parent()
      .with_context(|| format!("Failed to get parent directory of {}", bin_path.display()))?;

    let hook_bin_path = bin_dir.join(HOOK_BIN);
    if !hook_bin_path.exists() {
      bail!("Hook binary not found at {}", hook_bin_path.display());
    }

    Self::for_repository(&current_dir, hook_bin_path)
  }

  /// Resolves the hooks directory of the repository containing `dir`.
  pub fn for_repository(dir: &Path, hook_bin_path: PathBuf) -> Result<Self> {
    let repo = {
      profile!("Open git repository");
      Repository::open_ext(dir, Flags::empty(), Vec::<&Path>::new())
        .with_context(|| format!("Failed to open repository at {}", dir.display()))?
    };

    let git_path = {
      let path = repo.path().to_path_buf();
      if path.is_relative() {
        dir.join(path)
      } else {
        path
      }
    };

    Ok(Self { hook_bin_path, git_hooks_path: git_path.join("hooks") })
  }

  pub fn hook_bin_path(&self) -> File {
    File::new(self.hook_bin_path.clone())
  }

  pub fn git_hooks_path(&self) -> Dir {
    Dir::new(self.git_hooks_path.clone())
  }

  /// Path of the installed `commit-msg` hook.
  pub fn commit_msg_path(&self) -> Result<File> {
    profile!("Get commit-msg hook path");
    if !self.git_hooks_path.exists() {
      bail!("Hooks directory not found at {}", self.git_hooks_path.display());
    }

    Ok(File::new(self.git_hooks_path.join(HOOK_NAME)))
  }
}
