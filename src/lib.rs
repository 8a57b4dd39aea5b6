#[macro_export]
macro_rules! profile {
  ($name:expr) => {
    let _span = tracing::span!(tracing::Level::DEBUG, $name);
    let _enter = _span.enter();
  };
}

pub mod annotate;
pub mod config;
pub mod filesystem;
pub mod git;
pub mod hook;
pub mod pattern;
pub mod profiling;
pub mod ticket;

// Re-exports
pub use annotate::{Annotation, Annotator, Outcome};
pub use profiling::Profile;
pub use ticket::Ticket;
