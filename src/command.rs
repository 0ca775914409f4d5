//! Server commands and the replies built from their outcomes.

use std::fmt;

/// A verb plus its already-formatted arguments, as written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
  verb: String,
  arguments: Vec<String>,
}

impl CommandRequest {
  pub fn new(verb: impl Into<String>) -> Self {
    Self {
      verb: verb.into(),
      arguments: Vec::new(),
    }
  }

  #[must_use]
  pub fn arg(mut self, argument: impl Into<String>) -> Self {
    self.arguments.push(argument.into());
    self
  }

  pub fn verb(&self) -> &str {
    &self.verb
  }

  pub fn arguments(&self) -> &[String] {
    &self.arguments
  }

  /// Render the command line, optionally behind a protocol marker.
  pub fn render(&self, prefix: Option<char>) -> String {
    let mut line = String::new();
    if let Some(prefix) = prefix {
      line.push(prefix);
    }
    line.push_str(&self.verb);
    for argument in &self.arguments {
      line.push(' ');
      line.push_str(argument);
    }
    line
  }
}

/// Administrative actions the relay knows how to phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RconCommand {
  Shutdown { seconds: u32, reason: String },
  Kill,
  Broadcast { message: String },
  Save,
  Info,
  ShowPlayers,
  Raw(String),
}

impl RconCommand {
  /// The wire request for this command.
  pub fn request(&self) -> CommandRequest {
    match self {
      Self::Shutdown { seconds, reason } => CommandRequest::new("Shutdown")
        .arg(seconds.to_string())
        .arg(quote(reason)),
      Self::Kill => CommandRequest::new("DoExit"),
      Self::Broadcast { message } => {
        CommandRequest::new("Broadcast").arg(quote(message))
      }
      Self::Save => CommandRequest::new("Save"),
      Self::Info => CommandRequest::new("Info"),
      Self::ShowPlayers => CommandRequest::new("ShowPlayers"),
      Self::Raw(command) => CommandRequest::new(command.as_str()),
    }
  }

  /// Arguments are required to be present and non-blank.
  pub fn has_required_arguments(&self) -> bool {
    match self {
      Self::Shutdown { seconds, reason } => {
        *seconds > 0 && !reason.trim().is_empty()
      }
      Self::Broadcast { message } => !message.trim().is_empty(),
      Self::Raw(command) => !command.trim().is_empty(),
      Self::Kill | Self::Save | Self::Info | Self::ShowPlayers => true,
    }
  }

  /// Reply shown when the server accepted the command.
  pub fn success_reply(&self, response: &str) -> String {
    match self {
      Self::Shutdown { seconds, reason } => format!(
        "Success: Server will shutdown in {seconds} seconds with reason: {reason}"
      ),
      Self::Kill => "Success: Server killed.".to_string(),
      Self::Broadcast { message } => {
        format!("Success: Message broadcasted: {message}")
      }
      Self::Save => "Success: Server saved.".to_string(),
      Self::Info => format!("Success: Server info:\n{response}"),
      Self::ShowPlayers => format!("Success: Players:\n{response}"),
      Self::Raw(_) => format!("Success: Command sent:\n{response}"),
    }
  }

  /// What failed, phrased for the user without the cause.
  pub fn failure_action(&self) -> &'static str {
    match self {
      Self::Shutdown { .. } => "shutdown server",
      Self::Kill => "kill server",
      Self::Broadcast { .. } => "broadcast message",
      Self::Save => "save server",
      Self::Info => "get server info",
      Self::ShowPlayers => "get players",
      Self::Raw(_) => "send command",
    }
  }

  pub fn failure_summary(&self) -> String {
    format!("Failed to {}.", self.failure_action())
  }
}

impl fmt::Display for RconCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.request().render(None))
  }
}

fn quote(text: &str) -> String {
  format!("\"{text}\"")
}

/// Sanitise raw console input before it is sent to the server.
///
/// The function trims trailing carriage-return (`\r`) and line-feed (`\n`)
/// characters, then checks whether the remaining content is non-empty. An
/// empty or whitespace-only input yields `None`, signalling that no command
/// should be dispatched.
///
/// # Examples
///
/// ```
/// use rcon_relay::command::sanitize;
///
/// assert_eq!(sanitize("ShowPlayers\n"), Some("ShowPlayers".to_string()));
/// assert_eq!(sanitize("\n\n"), None);
/// ```
#[must_use]
pub fn sanitize(raw: &str) -> Option<String> {
  let trimmed = raw.trim_matches(['\r', '\n']);
  if trimmed.trim().is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

/// Whether console input asks to leave the console (`quit` or `exit`).
#[must_use]
pub fn is_exit_command(raw: &str) -> bool {
  matches!(
    sanitize(raw).as_deref().map(str::trim),
    Some(cmd) if cmd.eq_ignore_ascii_case("quit")
      || cmd.eq_ignore_ascii_case("exit")
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_forms_match_server_verbs() {
    let shutdown = RconCommand::Shutdown {
      seconds: 30,
      reason: "maintenance".into(),
    };
    assert_eq!(shutdown.to_string(), "Shutdown 30 \"maintenance\"");
    assert_eq!(RconCommand::Kill.to_string(), "DoExit");
    assert_eq!(
      RconCommand::Broadcast {
        message: "hello all".into()
      }
      .to_string(),
      "Broadcast \"hello all\""
    );
    assert_eq!(RconCommand::Save.to_string(), "Save");
    assert_eq!(RconCommand::Info.to_string(), "Info");
    assert_eq!(RconCommand::ShowPlayers.to_string(), "ShowPlayers");
    assert_eq!(
      RconCommand::Raw("KickPlayer 42".into()).to_string(),
      "KickPlayer 42"
    );
  }

  #[test]
  fn prefix_marker_precedes_the_verb() {
    let request = RconCommand::Save.request();
    assert_eq!(request.render(Some('/')), "/Save");

    let request = CommandRequest::new("Broadcast").arg("\"hi\"");
    assert_eq!(request.verb(), "Broadcast");
    assert_eq!(request.arguments(), ["\"hi\""]);
    assert_eq!(request.render(Some('/')), "/Broadcast \"hi\"");
  }

  #[test]
  fn missing_arguments_are_detected() {
    let zero = RconCommand::Shutdown {
      seconds: 0,
      reason: "x".into(),
    };
    assert!(!zero.has_required_arguments());

    let blank = RconCommand::Broadcast {
      message: "  ".into(),
    };
    assert!(!blank.has_required_arguments());
    assert!(!RconCommand::Raw(String::new()).has_required_arguments());
    assert!(RconCommand::Info.has_required_arguments());
  }

  #[test]
  fn replies_follow_bot_phrasing() {
    let shutdown = RconCommand::Shutdown {
      seconds: 30,
      reason: "maintenance".into(),
    };
    assert_eq!(
      shutdown.success_reply("ignored"),
      "Success: Server will shutdown in 30 seconds with reason: maintenance"
    );
    assert_eq!(shutdown.failure_summary(), "Failed to shutdown server.");
    assert_eq!(
      RconCommand::ShowPlayers.success_reply("2 players: Alice, Bob"),
      "Success: Players:\n2 players: Alice, Bob"
    );
    assert_eq!(RconCommand::Kill.failure_summary(), "Failed to kill server.");
  }

  #[test]
  fn sanitize_removes_trailing_newlines() {
    assert_eq!(sanitize("Info\n"), Some("Info".to_string()));
    assert_eq!(sanitize("Info\r\n"), Some("Info".to_string()));
    assert_eq!(sanitize("Info\r\n\n"), Some("Info".to_string()));
  }

  #[test]
  fn sanitize_rejects_blank_input() {
    assert_eq!(sanitize("   \n"), None);
    assert_eq!(sanitize("\n\n"), None);
  }

  #[test]
  fn exit_detection_is_case_insensitive() {
    assert!(is_exit_command("quit"));
    assert!(is_exit_command("QUIT"));
    assert!(is_exit_command(" Exit \n"));
    assert!(!is_exit_command("quiet"));
  }
}
