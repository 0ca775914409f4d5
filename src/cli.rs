use clap::{ArgAction, Args, Parser, Subcommand};

use crate::transport::TransportKind;

/// Command-line arguments for the RCON relay.
#[derive(Parser, Debug, Clone)]
#[command(
  author,
  version,
  about = "Relay administrative commands to a game server over RCON"
)]
pub struct Cli {
  #[command(flatten)]
  pub connection: ConnectionArgs,

  /// Increase logging verbosity (repeat for TRACE).
  #[arg(short, long, global = true, action = ArgAction::Count)]
  pub verbose: u8,

  /// Disable ANSI color output.
  #[arg(long, global = true)]
  pub plain: bool,

  #[command(subcommand)]
  pub action: Action,
}

/// Where and how to reach the RCON endpoint.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
  /// Hostname or IP address of the RCON server.
  #[arg(long, env = "RCON_HOST", default_value = "localhost")]
  pub host: String,

  /// TCP port exposed by the RCON server.
  #[arg(
    long,
    env = "RCON_PORT",
    default_value_t = 25_575,
    value_parser = clap::value_parser!(u16).range(1..)
  )]
  pub port: u16,

  /// RCON password.
  #[arg(long, env = "RCON_PASSWORD", default_value = "", hide_env_values = true)]
  pub password: String,

  /// Transport used to talk to the server: source or arrcon.
  #[arg(long, env = "RCON_TRANSPORT", default_value_t = TransportKind::Source)]
  pub transport: TransportKind,

  /// I/O timeout in milliseconds.
  #[arg(
    long,
    env = "RCON_TIMEOUT_MS",
    default_value_t = 10_000,
    value_name = "MILLISECONDS"
  )]
  pub timeout_ms: u64,

  /// ARRCON executable used by the `arrcon` transport.
  #[arg(long, env = "ARRCON_PATH", default_value = "ARRCON")]
  pub arrcon_path: String,

  /// Marker character some servers expect in front of every command.
  #[arg(long, env = "RCON_COMMAND_PREFIX")]
  pub command_prefix: Option<char>,
}

/// Server actions, one per bot subcommand.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
  /// Shut the server down after a delay, telling players why.
  Shutdown {
    /// Seconds to wait before shutting down.
    seconds: u32,
    /// Reason broadcast to players.
    reason: String,
  },
  /// Stop the server immediately.
  Kill,
  /// Broadcast a message to all players.
  Broadcast {
    /// Message to broadcast.
    message: String,
  },
  /// Save the world.
  Save,
  /// Show server information.
  Info,
  /// List connected players.
  #[command(name = "showplayers")]
  ShowPlayers,
  /// Send an arbitrary command.
  #[command(trailing_var_arg = true)]
  Command {
    /// Command text; words are joined with single spaces.
    #[arg(value_name = "COMMAND", required = true, allow_hyphen_values = true)]
    words: Vec<String>,
  },
  /// Open an interactive console that reuses one session.
  Console,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("parse")
  }

  #[test]
  fn shutdown_takes_seconds_and_reason() {
    let cli = parse(&["rcon-relay", "shutdown", "30", "maintenance"]);
    assert_eq!(
      cli.action,
      Action::Shutdown {
        seconds: 30,
        reason: "maintenance".into()
      }
    );
  }

  #[test]
  fn command_collects_trailing_words() {
    let cli = parse(&["rcon-relay", "command", "KickPlayer", "-1234"]);
    assert_eq!(
      cli.action,
      Action::Command {
        words: vec!["KickPlayer".into(), "-1234".into()]
      }
    );
  }

  #[test]
  fn transport_and_port_are_validated() {
    let cli = parse(&["rcon-relay", "--transport", "arrcon", "--port", "1", "info"]);
    assert_eq!(cli.connection.transport, TransportKind::Arrcon);
    assert_eq!(cli.connection.port, 1);

    assert!(Cli::try_parse_from(["rcon-relay", "--port", "0", "info"]).is_err());
    assert!(
      Cli::try_parse_from(["rcon-relay", "--port", "65536", "info"]).is_err()
    );
    assert!(
      Cli::try_parse_from(["rcon-relay", "--transport", "telnet", "info"])
        .is_err()
    );
  }
}
