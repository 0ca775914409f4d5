//! Error type shared by every RCON transport.
//!
//! Each failure carries exactly one [`ErrorKind`] so callers only ever need
//! the classified outcome; the free-form detail and the optional I/O source
//! are for logs.

use std::io;

use thiserror::Error;

use crate::classify::ErrorKind;

/// A terminal failure of one RCON exchange.
#[derive(Debug, Error)]
#[error("{kind}: {detail}")]
pub struct RconError {
  kind: ErrorKind,
  detail: String,
  #[source]
  source: Option<io::Error>,
}

impl RconError {
  pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
    Self {
      kind,
      detail: detail.into(),
      source: None,
    }
  }

  /// Attach the underlying I/O failure.
  #[must_use]
  pub fn with_source(mut self, source: io::Error) -> Self {
    self.source = Some(source);
    self
  }

  pub fn transport(detail: impl Into<String>) -> Self {
    Self::new(ErrorKind::Transport, detail)
  }

  pub fn kind(&self) -> ErrorKind {
    self.kind
  }

  pub fn detail(&self) -> &str {
    &self.detail
  }

  /// Text safe to show the end user.
  pub fn user_message(&self) -> &'static str {
    self.kind.user_message()
  }
}

impl From<ErrorKind> for RconError {
  fn from(kind: ErrorKind) -> Self {
    Self::new(kind, kind.user_message())
  }
}

pub type Result<T, E = RconError> = std::result::Result<T, E>;
