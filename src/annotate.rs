use std::fmt::{self, Display};

use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

use crate::pattern::PatternTable;
use crate::ticket::Ticket;

pub const DEFAULT_SKIP_PREFIXES: &[&str] = &["Merge", "Revert", "WIP", "Draft"];
pub const DEFAULT_FORMAT: &str = "[{{{ticket}}}] {{{message}}}";
pub const DEFAULT_COMMENT_CHAR: u8 = b'#';

// Placeholders rendered into the template to locate the variables
const TICKET_MARK: &str = "\u{1}ticket\u{1}";
const MESSAGE_MARK: &str = "\u{1}message\u{1}";

static DEFAULT_TEMPLATE: Lazy<Format> =
  Lazy::new(|| Format::parse(DEFAULT_FORMAT).expect("Built-in commit format must be valid"));

#[derive(Error, Debug)]
pub enum FormatError {
  #[error("Invalid commit format template: {0}")]
  Template(#[from] mustache::Error),

  #[error("Commit format must reference the {0} variable")]
  MissingVariable(&'static str)
}

#[derive(Serialize)]
struct Placeholders<'a> {
  ticket:  &'a str,
  message: &'a str
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
  Text(String),
  Ticket,
  Message
}

/// A compiled output format such as `[{{{ticket}}}] {{{message}}}`.
///
/// The mustache template is rendered once with placeholders and kept as
/// pieces, so annotating never fails and never HTML-escapes the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
  source: String,
  pieces: Vec<Piece>
}

impl Format {
  pub fn parse(source: &str) -> Result<Self, FormatError> {
    let template = mustache::compile_str(source)?;
    let rendered = template.render_to_string(&Placeholders { ticket: TICKET_MARK, message: MESSAGE_MARK })?;
    let pieces = split(&rendered);

    if !pieces.contains(&Piece::Ticket) {
      return Err(FormatError::MissingVariable("ticket"));
    }

    if !pieces.contains(&Piece::Message) {
      return Err(FormatError::MissingVariable("message"));
    }

    Ok(Self { source: source.to_string(), pieces })
  }

  pub fn as_str(&self) -> &str {
    &self.source
  }

  pub fn render(&self, ticket: &Ticket, message: &str) -> String {
    self.pieces.iter().fold(String::with_capacity(message.len() + 16), |mut acc, piece| {
      match piece {
        Piece::Text(text) => acc.push_str(text),
        Piece::Ticket => acc.push_str(ticket.as_str()),
        Piece::Message => acc.push_str(message)
      }
      acc
    })
  }

  /// The marker that shows a message already carries this ticket, e.g. `[ABC-123]`.
  pub fn tag(&self, ticket: &Ticket) -> String {
    self.render(ticket, "").trim().to_string()
  }
}

impl Default for Format {
  fn default() -> Self {
    DEFAULT_TEMPLATE.clone()
  }
}

fn split(rendered: &str) -> Vec<Piece> {
  let mut pieces = Vec::new();
  let mut rest = rendered;

  while !rest.is_empty() {
    let ticket = rest.find(TICKET_MARK).map(|at| (at, TICKET_MARK, Piece::Ticket));
    let message = rest.find(MESSAGE_MARK).map(|at| (at, MESSAGE_MARK, Piece::Message));
    let next = [ticket, message].into_iter().flatten().min_by_key(|(at, ..)| *at);

    match next {
      Some((at, mark, piece)) => {
        if at > 0 {
          pieces.push(Piece::Text(rest[..at].to_string()));
        }
        pieces.push(piece);
        rest = &rest[at + mark.len()..];
      },
      None => {
        pieces.push(Piece::Text(rest.to_string()));
        break;
      }
    }
  }

  pieces
}

/// Why a message was or was not rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Applied(Ticket),
  Skipped(String),
  NoMatch,
  AlreadyAnnotated(Ticket),
  EmptyMessage
}

impl Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Outcome::Applied(ticket) => write!(f, "tagged with {ticket}"),
      Outcome::Skipped(prefix) => write!(f, "skipped, message starts with '{prefix}'"),
      Outcome::NoMatch => write!(f, "no ticket found in branch"),
      Outcome::AlreadyAnnotated(ticket) => write!(f, "already tagged with {ticket}"),
      Outcome::EmptyMessage => write!(f, "empty message")
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
  pub message: String,
  pub outcome: Outcome
}

impl Annotation {
  pub fn applied(&self) -> bool {
    matches!(self.outcome, Outcome::Applied(_))
  }

  pub fn ticket(&self) -> Option<&Ticket> {
    match &self.outcome {
      Outcome::Applied(ticket) | Outcome::AlreadyAnnotated(ticket) => Some(ticket),
      _ => None
    }
  }

  fn unchanged(message: &str, outcome: Outcome) -> Self {
    Self { message: message.to_string(), outcome }
  }
}

/// Prepends the ticket found in a branch name to a commit message.
#[derive(Debug, Clone)]
pub struct Annotator {
  patterns:      PatternTable,
  skip_prefixes: Vec<String>,
  format:        Format,
  comment_char:  u8
}

impl Default for Annotator {
  fn default() -> Self {
    Self::new(
      PatternTable::default(),
      DEFAULT_SKIP_PREFIXES.iter().map(ToString::to_string).collect(),
      Format::default()
    )
  }
}

impl Annotator {
  pub fn new(patterns: PatternTable, skip_prefixes: Vec<String>, format: Format) -> Self {
    let skip_prefixes = skip_prefixes.into_iter().filter(|p| !p.is_empty()).collect();
    Self { patterns, skip_prefixes, format, comment_char: DEFAULT_COMMENT_CHAR }
  }

  /// Lines starting with this byte are git comments and do not count as message content.
  pub fn with_comment_char(mut self, comment_char: u8) -> Self {
    self.comment_char = comment_char;
    self
  }

  pub fn comment_char(&self) -> u8 {
    self.comment_char
  }

  /// Whether git would abort on this message once it strips comments and blank lines.
  fn is_empty_message(&self, message: &str) -> bool {
    match git2::message_prettify(message, Some(self.comment_char)) {
      Ok(cleaned) => cleaned.trim().is_empty(),
      Err(_) => message.trim().is_empty()
    }
  }

  pub fn patterns(&self) -> &PatternTable {
    &self.patterns
  }

  pub fn skip_prefixes(&self) -> &[String] {
    &self.skip_prefixes
  }

  pub fn format(&self) -> &Format {
    &self.format
  }

  pub fn annotate(&self, branch: &str, message: &str) -> Annotation {
    profile!("Annotate commit message");

    if let Some(prefix) = self.skip_prefixes.iter().find(|p| message.starts_with(p.as_str())) {
      return Annotation::unchanged(message, Outcome::Skipped(prefix.clone()));
    }

    if self.is_empty_message(message) {
      return Annotation::unchanged(message, Outcome::EmptyMessage);
    }

    let Some(ticket) = self.patterns.find(branch) else {
      return Annotation::unchanged(message, Outcome::NoMatch);
    };

    if message.contains(&self.format.tag(&ticket)) {
      return Annotation::unchanged(message, Outcome::AlreadyAnnotated(ticket));
    }

    Annotation {
      message: self.format.render(&ticket, message),
      outcome: Outcome::Applied(ticket)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_format() {
    let format = Format::default();
    let ticket = Ticket::new("ABC-1");
    assert_eq!(format.render(&ticket, "fix it"), "[ABC-1] fix it");
    assert_eq!(format.tag(&ticket), "[ABC-1]");
  }

  #[test]
  fn test_format_does_not_escape_message() {
    let format = Format::parse("{{ticket}}: {{message}}").unwrap();
    let ticket = Ticket::new("ABC-1");
    assert_eq!(format.render(&ticket, "a < b & \"c\""), "ABC-1: a < b & \"c\"");
  }

  #[test]
  fn test_format_with_trailing_ticket() {
    let format = Format::parse("{{{message}}} ({{ticket}})").unwrap();
    let ticket = Ticket::new("OPS-9");
    assert_eq!(format.render(&ticket, "tidy"), "tidy (OPS-9)");
    assert_eq!(format.tag(&ticket), "(OPS-9)");
  }

  #[test]
  fn test_format_requires_both_variables() {
    assert!(matches!(Format::parse("{{message}}"), Err(FormatError::MissingVariable("ticket"))));
    assert!(matches!(Format::parse("[{{ticket}}]"), Err(FormatError::MissingVariable("message"))));
  }

  #[test]
  fn test_format_rejects_broken_template() {
    assert!(matches!(Format::parse("{{#ticket}} {{message}}"), Err(FormatError::Template(_))));
  }

  #[test]
  fn test_empty_skip_prefix_is_ignored() {
    let annotator = Annotator::new(PatternTable::default(), vec![String::new()], Format::default());
    assert!(annotator.skip_prefixes().is_empty());
    assert!(annotator.annotate("ABC-1", "msg").applied());
  }

  #[test]
  fn test_empty_message_is_left_alone() {
    let annotation = Annotator::default().annotate("feature/ABC-1", "  \n");
    assert_eq!(annotation.outcome, Outcome::EmptyMessage);
    assert_eq!(annotation.message, "  \n");
  }

  #[test]
  fn test_comment_only_message_is_empty() {
    let template = "\n# Please enter the commit message for your changes. Lines starting\n# with '#' will be ignored.\n";
    let annotation = Annotator::default().annotate("feature/ABC-123-x", template);
    assert_eq!(annotation.outcome, Outcome::EmptyMessage);
    assert_eq!(annotation.message, template);
  }

  #[test]
  fn test_message_with_trailing_comments_is_tagged() {
    let message = "add login\n# Please enter the commit message\n";
    let annotation = Annotator::default().annotate("feature/ABC-123-x", message);
    assert_eq!(annotation.message, "[ABC-123] add login\n# Please enter the commit message\n");
  }

  #[test]
  fn test_custom_comment_char() {
    let annotator = Annotator::default().with_comment_char(b';');
    assert_eq!(annotator.comment_char(), b';');
    assert_eq!(annotator.annotate("ABC-1", "; only a comment\n").outcome, Outcome::EmptyMessage);
    assert!(annotator.annotate("ABC-1", "# heading kept\n").applied());
  }

  #[test]
  fn test_ticket_accessor() {
    let annotator = Annotator::default();
    let annotation = annotator.annotate("ABC-1", "msg");
    assert_eq!(annotation.ticket(), Some(&Ticket::new("ABC-1")));
    assert_eq!(annotator.annotate("ABC-1", &annotation.message).ticket(), Some(&Ticket::new("ABC-1")));
    assert_eq!(annotator.annotate("main", "msg").ticket(), None);
  }

  #[test]
  fn test_outcome_display() {
    assert_eq!(Outcome::Applied(Ticket::new("A-1")).to_string(), "tagged with A-1");
    assert_eq!(Outcome::NoMatch.to_string(), "no ticket found in branch");
  }
}
