use std::fmt::{self, Display};

/// A normalized project-tracker identifier such as `ABC-123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket(String);

impl Ticket {
  /// Wraps an already normalized identifier.
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Builds a ticket from a raw branch segment such as `abc123`.
  ///
  /// The trailing digit run is separated from the letters before it with a
  /// dash when one is missing, and the whole result is uppercased.
  pub fn dashed(raw: &str) -> Self {
    let digits = raw
      .char_indices()
      .rev()
      .take_while(|(_, c)| c.is_ascii_digit())
      .last()
      .map(|(i, _)| i);

    let id = match digits {
      Some(at) if at > 0 => {
        let (head, tail) = raw.split_at(at);
        match head.chars().last() {
          Some(c) if c.is_alphabetic() => format!("{head}-{tail}"),
          _ => raw.to_string()
        }
      },
      _ => raw.to_string()
    };

    Self(id.to_uppercase())
  }

  pub fn uppercase(raw: &str) -> Self {
    Self(raw.to_uppercase())
  }
}

impl Display for Ticket {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl AsRef<str> for Ticket {
  fn as_ref(&self) -> &str {
    &self.0
  }
}
