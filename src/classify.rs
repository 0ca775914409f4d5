use std::fmt;

/// Failure categories an RCON exchange can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// No response came back, or the socket/process failed mid-exchange.
  Transport,
  /// The server did not recognise the verb.
  UnknownCommand,
  /// The server rejected the password.
  Auth,
  /// The RCON host name could not be resolved.
  HostResolution,
  /// The host was reachable by name but the port refused or timed out.
  Connection,
}

impl ErrorKind {
  /// Short, human-readable text shown to whoever issued the command.
  pub const fn user_message(self) -> &'static str {
    match self {
      Self::Transport => "Failed to send command.",
      Self::UnknownCommand => "Unknown command.",
      Self::Auth => "Incorrect password.",
      Self::HostResolution => "Hostname is invalid.",
      Self::Connection => "Connection failed possibly due to bad port.",
    }
  }

  /// Canonical snake_case label used in logs.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Transport => "transport_error",
      Self::UnknownCommand => "unknown_command_error",
      Self::Auth => "auth_error",
      Self::HostResolution => "host_resolution_error",
      Self::Connection => "connection_error",
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Vendor failure markers, checked top to bottom. First match wins.
pub const MARKERS: &[(&str, ErrorKind)] = &[
  ("Unknown command", ErrorKind::UnknownCommand),
  ("Incorrect Password!", ErrorKind::Auth),
  ("Name resolution failed!", ErrorKind::HostResolution),
  ("Connection Failed.", ErrorKind::Connection),
];

/// Decide whether a raw RCON response is a success or a known failure.
///
/// An absent or empty response is always a [`ErrorKind::Transport`] failure.
/// Otherwise the response is scanned for each entry of [`MARKERS`] in order;
/// the first marker found anywhere in the text decides the kind. A response
/// carrying no marker is returned untouched.
pub fn classify(response: Option<&str>) -> Result<&str, ErrorKind> {
  let outcome = match response {
    None | Some("") => Err(ErrorKind::Transport),
    Some(text) => match marker_kind(text) {
      Some(kind) => Err(kind),
      None => Ok(text),
    },
  };

  if let Err(kind) = outcome {
    tracing::warn!(kind = %kind, "{}", kind.user_message());
  }

  outcome
}

/// Look up the first marker contained in `text`, if any.
pub fn marker_kind(text: &str) -> Option<ErrorKind> {
  MARKERS
    .iter()
    .find(|(marker, _)| text.contains(marker))
    .map(|(_, kind)| *kind)
}
