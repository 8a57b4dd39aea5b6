use std::io::Write;
use std::path::PathBuf;
use std::fs::File;

use serde::{Deserialize, Serialize};
use config::{Config, Environment, FileFormat, Map};
use anyhow::{bail, Context, Result};
use console::Emoji;

use crate::annotate::{Annotator, Format, DEFAULT_FORMAT, DEFAULT_SKIP_PREFIXES};
use crate::pattern::{PatternTable, DEFAULT_PATTERNS};

const ENV_PREFIX: &str = "GIT_TICKET";

#[derive(Debug, Default, Deserialize, PartialEq, Eq, Serialize, Clone)]
pub struct App {
  /// Whitespace separated `[rule:]regex` entries, highest priority first
  pub patterns:      Option<String>,
  /// Comma separated literal prefixes
  pub skip_prefixes: Option<String>,
  pub format:        Option<String>
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
  pub dir:  PathBuf,
  pub file: PathBuf
}

impl ConfigPaths {
  pub fn new() -> Result<Self> {
    let home = home::home_dir().context("Failed to determine home directory")?;
    Ok(Self::in_dir(home.join(".config/git-ticket")))
  }

  pub fn in_dir(dir: PathBuf) -> Self {
    let file = dir.join("config.ini");
    Self { dir, file }
  }

  fn ensure_exists(&self) -> Result<()> {
    if !self.dir.exists() {
      std::fs::create_dir_all(&self.dir).with_context(|| format!("Failed to create config directory at {:?}", self.dir))?;
    }
    if !self.file.exists() {
      File::create(&self.file).with_context(|| format!("Failed to create config file at {:?}", self.file))?;
    }
    Ok(())
  }
}

pub fn default_patterns() -> String {
  DEFAULT_PATTERNS.join(" ")
}

pub fn default_skip_prefixes() -> String {
  DEFAULT_SKIP_PREFIXES.join(",")
}

impl App {
  /// Loads the user's config file, with `GIT_TICKET_*` variables taking precedence.
  pub fn new() -> Result<Self> {
    dotenv::dotenv().ok();
    Self::load(&ConfigPaths::new()?)
  }

  pub fn load(paths: &ConfigPaths) -> Result<Self> {
    Self::load_with_env(paths, None)
  }

  /// Loads with `env` standing in for the process environment when given.
  pub fn load_with_env(paths: &ConfigPaths, env: Option<Map<String, String>>) -> Result<Self> {
    profile!("Load config");
    paths.ensure_exists()?;

    let environment = match env {
      Some(vars) => Environment::with_prefix(ENV_PREFIX).source(Some(vars)),
      None => Environment::with_prefix(ENV_PREFIX)
    };

    let config = Config::builder()
      .add_source(config::File::new(paths.file.to_string_lossy().as_ref(), FileFormat::Ini))
      .add_source(environment)
      .set_default("patterns", default_patterns())?
      .set_default("skip_prefixes", default_skip_prefixes())?
      .set_default("format", DEFAULT_FORMAT)?
      .build()?;

    config
      .try_deserialize()
      .context("Failed to deserialize existing config. Please run `git ticket config reset` and try again")
  }

  pub fn patterns(&self) -> Result<PatternTable> {
    match &self.patterns {
      Some(list) if !list.trim().is_empty() => PatternTable::parse(list).context("Failed to parse ticket patterns"),
      _ => Ok(PatternTable::default())
    }
  }

  /// An explicitly empty value disables skipping altogether.
  pub fn skip_prefixes(&self) -> Vec<String> {
    match &self.skip_prefixes {
      Some(list) => list
        .split(',')
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(ToString::to_string)
        .collect(),
      None => DEFAULT_SKIP_PREFIXES.iter().map(ToString::to_string).collect()
    }
  }

  pub fn format(&self) -> Result<Format> {
    match &self.format {
      Some(source) if !source.trim().is_empty() => Format::parse(source).context("Failed to parse commit format"),
      _ => Ok(Format::default())
    }
  }

  pub fn annotator(&self) -> Result<Annotator> {
    Ok(Annotator::new(self.patterns()?, self.skip_prefixes(), self.format()?))
  }

  /// Fills unset options with their defaults so the saved file is self-describing.
  pub fn resolved(&self) -> Self {
    Self {
      patterns:      Some(self.patterns.clone().unwrap_or_else(default_patterns)),
      skip_prefixes: Some(self.skip_prefixes.clone().unwrap_or_else(default_skip_prefixes)),
      format:        Some(self.format.clone().unwrap_or_else(|| DEFAULT_FORMAT.to_string()))
    }
  }

  /// The INI reader unescapes backslashes, so they are doubled on the way out.
  fn escaped(&self) -> Self {
    let escape = |value: &Option<String>| value.as_ref().map(|v| v.replace('\\', "\\\\"));
    Self {
      patterns:      escape(&self.patterns),
      skip_prefixes: escape(&self.skip_prefixes),
      format:        escape(&self.format)
    }
  }

  /// Writes the config and reads it back, failing if any value would not survive the trip.
  pub fn save(&self, paths: &ConfigPaths) -> Result<()> {
    paths.ensure_exists()?;
    let resolved = self.resolved();
    let escaped = resolved.escaped();
    let contents = serde_ini::to_string(&escaped).context(format!("Failed to serialize config: {:?}", resolved))?;
    let mut file = File::create(&paths.file).with_context(|| format!("Failed to create config file at {:?}", paths.file))?;
    file
      .write_all(contents.as_bytes())
      .context("Failed to write config file")?;

    let reloaded = Self::load_with_env(paths, Some(Map::new()))?;
    if reloaded != resolved {
      bail!(
        "Configuration could not be stored faithfully in {:?} (wrote {:?}, read back {:?})",
        paths.file,
        resolved,
        reloaded
      );
    }

    Ok(())
  }

  /// Sets a single option by its CLI name. The change is only kept when the
  /// resulting configuration still builds an annotator.
  pub fn update(&mut self, key: &str, value: String) -> Result<()> {
    let mut updated = self.clone();

    match key {
      "patterns" => updated.patterns = Some(value),
      "skip-prefixes" | "skip_prefixes" => updated.skip_prefixes = Some(value),
      "format" => updated.format = Some(value),
      other => bail!("Unknown configuration option '{}', expected one of: patterns, skip-prefixes, format", other)
    }

    updated.annotator()?;
    *self = updated;
    Ok(())
  }

  pub fn update_and_save(&mut self, key: &str, value: String, paths: &ConfigPaths) -> Result<()> {
    self.update(key, value)?;
    println!("{} Configuration option {} updated!", Emoji("✨", ":-)"), key);
    self.save(paths)
  }

  pub fn reset(paths: &ConfigPaths) -> Result<()> {
    Self::default().save(paths)?;
    println!("{} Configuration reset to defaults", Emoji("✨", ":-)"));
    Ok(())
  }
}
