use std::fmt::{self, Display};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::ticket::Ticket;

/// Built-in branch patterns, in priority order.
pub const DEFAULT_PATTERNS: &[&str] = &[
  "[A-Z]+-[0-9]+",
  "[A-Z]+[0-9]+",
  "[A-Z]{2,}-[0-9]+",
  "[a-z]+-[0-9]+",
  "[a-z]+[0-9]+",
  "[a-z]{2,}-[0-9]+"
];

static DEFAULT_TABLE: Lazy<PatternTable> = Lazy::new(|| {
  PatternTable::new(
    DEFAULT_PATTERNS
      .iter()
      .map(|source| TicketPattern::new(source, Normalization::Dashed))
      .collect::<Result<Vec<_>, _>>()
      .expect("Built-in ticket patterns must compile")
  )
});

#[derive(Error, Debug)]
pub enum PatternError {
  #[error("Invalid ticket pattern '{pattern}': {source}")]
  InvalidRegex {
    pattern: String,
    #[source]
    source:  regex::Error
  },

  #[error("Unknown normalization rule '{0}', expected one of: dashed, uppercase, verbatim")]
  UnknownNormalization(String)
}

/// How a matched branch segment is turned into a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
  /// `abc123` -> `ABC-123`
  #[default]
  Dashed,
  /// `abc_123` -> `ABC_123`
  Uppercase,
  /// Taken as is
  Verbatim
}

impl Normalization {
  pub fn apply(&self, raw: &str) -> Ticket {
    match self {
      Normalization::Dashed => Ticket::dashed(raw),
      Normalization::Uppercase => Ticket::uppercase(raw),
      Normalization::Verbatim => Ticket::new(raw)
    }
  }
}

impl FromStr for Normalization {
  type Err = PatternError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "dashed" => Ok(Normalization::Dashed),
      "uppercase" => Ok(Normalization::Uppercase),
      "verbatim" => Ok(Normalization::Verbatim),
      other => Err(PatternError::UnknownNormalization(other.to_string()))
    }
  }
}

impl Display for Normalization {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Normalization::Dashed => "dashed",
      Normalization::Uppercase => "uppercase",
      Normalization::Verbatim => "verbatim"
    };
    write!(f, "{name}")
  }
}

/// A single (matcher, normalizer) pair.
#[derive(Debug, Clone)]
pub struct TicketPattern {
  regex:         Regex,
  normalization: Normalization
}

impl TicketPattern {
  pub fn new(pattern: &str, normalization: Normalization) -> Result<Self, PatternError> {
    let regex = Regex::new(pattern).map_err(|source| {
      PatternError::InvalidRegex { pattern: pattern.to_string(), source }
    })?;

    Ok(Self { regex, normalization })
  }

  pub fn as_str(&self) -> &str {
    self.regex.as_str()
  }

  pub fn normalization(&self) -> Normalization {
    self.normalization
  }

  /// Searches the branch for the first occurrence of this pattern.
  /// The first capture group is used when the pattern has one.
  pub fn find(&self, branch: &str) -> Option<Ticket> {
    let captures = self.regex.captures(branch)?;
    let segment = captures.get(1).or_else(|| captures.get(0))?.as_str();

    if segment.is_empty() {
      return None;
    }

    Some(self.normalization.apply(segment))
  }
}

impl FromStr for TicketPattern {
  type Err = PatternError;

  /// Parses `regex` or `rule:regex`. The prefix is only treated as a rule
  /// when it names one, so patterns such as `(?:x)` stay intact.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if let Some((rule, pattern)) = s.split_once(':') {
      if let Ok(normalization) = rule.parse::<Normalization>() {
        return TicketPattern::new(pattern, normalization);
      }
    }

    TicketPattern::new(s, Normalization::default())
  }
}

impl Display for TicketPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.normalization, self.regex.as_str())
  }
}

/// An ordered list of patterns. The first one that matches wins.
#[derive(Debug, Clone)]
pub struct PatternTable {
  patterns: Vec<TicketPattern>
}

impl PatternTable {
  pub fn new(patterns: Vec<TicketPattern>) -> Self {
    Self { patterns }
  }

  /// Parses a whitespace separated list of `[rule:]regex` entries.
  pub fn parse(list: &str) -> Result<Self, PatternError> {
    list
      .split_whitespace()
      .map(str::parse)
      .collect::<Result<Vec<_>, _>>()
      .map(Self::new)
  }

  pub fn find(&self, branch: &str) -> Option<Ticket> {
    self.patterns.iter().find_map(|pattern| {
      let ticket = pattern.find(branch)?;
      log::trace!("Pattern {} matched {} in {}", pattern, ticket, branch);
      Some(ticket)
    })
  }

  pub fn len(&self) -> usize {
    self.patterns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &TicketPattern> {
    self.patterns.iter()
  }
}

impl FromIterator<TicketPattern> for PatternTable {
  fn from_iter<I: IntoIterator<Item = TicketPattern>>(iter: I) -> Self {
    Self::new(iter.into_iter().collect())
  }
}

impl Default for PatternTable {
  fn default() -> Self {
    DEFAULT_TABLE.clone()
  }
}
