//! One command in, one user-facing reply out.
//!
//! Front-ends (the CLI here, a chat bot elsewhere) hand over an
//! [`RconCommand`] and only ever see the resulting [`Reply`]; transport
//! errors never escape this module unclassified.

use std::fmt;

use crate::command::RconCommand;
use crate::config::Settings;
use crate::error::RconError;
use crate::transport::{RconTransport, Session};

/// Outcome of a dispatched command, ready to show a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
  Success(String),
  /// The exchange failed; `reason` is the classified cause.
  Failure {
    summary: String,
    reason: &'static str,
  },
  /// The command was rejected before any connection was attempted.
  Invalid(String),
}

impl Reply {
  pub fn is_success(&self) -> bool {
    matches!(self, Self::Success(_))
  }

  fn failure(command: &RconCommand, error: &RconError) -> Self {
    tracing::warn!(
      command = %command,
      kind = %error.kind(),
      error = %error,
      "RCON command failed"
    );
    Self::Failure {
      summary: command.failure_summary(),
      reason: error.user_message(),
    }
  }
}

impl fmt::Display for Reply {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Success(text) | Self::Invalid(text) => f.write_str(text),
      Self::Failure { summary, reason } => write!(f, "{summary} {reason}"),
    }
  }
}

/// Reject commands missing their arguments, in the bot's phrasing.
pub fn validate(command: &RconCommand) -> Result<(), Reply> {
  if command.has_required_arguments() {
    Ok(())
  } else {
    Err(Reply::Invalid(format!(
      "Failed to {}: Missing required arguments.",
      command.failure_action()
    )))
  }
}

/// Send `command` through an already open transport.
pub async fn execute<T>(
  transport: &mut T,
  command: &RconCommand,
  prefix: Option<char>,
) -> Reply
where
  T: RconTransport,
{
  let payload = command.request().render(prefix);
  match transport.send(&payload).await {
    Ok(response) => {
      tracing::info!(command = %command, "RCON command succeeded");
      Reply::Success(command.success_reply(&response))
    }
    Err(err) => Reply::failure(command, &err),
  }
}

/// Validate, open a fresh session, execute and close it again.
///
/// The session is closed on every path; a failed open aborts before any
/// command bytes are written.
pub async fn dispatch(settings: &Settings, command: &RconCommand) -> Reply {
  if let Err(invalid) = validate(command) {
    return invalid;
  }

  let mut session = match Session::open(settings).await {
    Ok(session) => session,
    Err(err) => return Reply::failure(command, &err),
  };

  let reply = execute(&mut session, command, settings.command_prefix).await;

  if let Err(err) = session.close().await {
    tracing::debug!(error = %err, "failed to close RCON session");
  }

  reply
}
