use std::path::Path;

use git2::{ErrorCode, Repository, RepositoryOpenFlags as Flag};
use anyhow::{Context, Result};
use log::debug;

use crate::annotate::DEFAULT_COMMENT_CHAR;

const HEADS_PREFIX: &str = "refs/heads/";

pub struct Repo {
  repo: Repository
}

impl Repo {
  /// Opens the repository git is running the hook in (honours `GIT_DIR`).
  pub fn from_env() -> Result<Self> {
    profile!("Open repository from env");
    let repo = Repository::open_from_env().context("Failed to open repository")?;
    Ok(Self { repo })
  }

  pub fn new_with_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let repo = Repository::open_ext(path, Flag::empty(), Vec::<&Path>::new())
      .with_context(|| format!("Failed to open repository at {}", path.display()))?;
    Ok(Self { repo })
  }

  pub fn path(&self) -> &Path {
    self.repo.path()
  }

  /// Name of the checked out branch, e.g. `feature/ABC-123-login`.
  ///
  /// A branch without commits yet is read from the symbolic `HEAD`.
  /// A detached `HEAD` has no branch and yields an empty string.
  pub fn current_branch(&self) -> Result<String> {
    profile!("Resolve current branch");

    match self.repo.head() {
      Ok(head) if head.is_branch() => Ok(head.shorthand().unwrap_or_default().to_string()),
      Ok(_) => {
        debug!("HEAD is detached, no branch to read");
        Ok(String::new())
      },
      Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => self.unborn_branch(),
      Err(e) => Err(e).context("Failed to resolve HEAD")
    }
  }

  /// The repository's `core.commentChar`, falling back to `#` when unset,
  /// `auto`, or not a single ASCII byte.
  pub fn comment_char(&self) -> u8 {
    let configured = self.repo.config().ok().and_then(|config| config.get_string("core.commentChar").ok());

    match configured.as_deref().map(str::as_bytes) {
      Some([byte]) if byte.is_ascii() => *byte,
      _ => DEFAULT_COMMENT_CHAR
    }
  }

  fn unborn_branch(&self) -> Result<String> {
    let head = self.repo.find_reference("HEAD").context("Failed to read HEAD")?;
    let target = head.symbolic_target().unwrap_or_default();
    debug!("HEAD points to unborn {}", target);
    Ok(target.strip_prefix(HEADS_PREFIX).unwrap_or(target).to_string())
  }
}
