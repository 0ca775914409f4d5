use std::path::PathBuf;
use std::time::Duration;

use crate::cli::ConnectionArgs;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::transport::TransportKind;

/// Everything needed to open a session, resolved once per invocation.
#[derive(Debug, Clone)]
pub struct Settings {
  pub endpoint: Endpoint,
  pub transport: TransportKind,
  pub timeout: Duration,
  pub arrcon_path: PathBuf,
  pub command_prefix: Option<char>,
}

impl Settings {
  /// Settings for `endpoint` with the stock transport and a 10 s timeout.
  pub fn new(endpoint: Endpoint) -> Self {
    Self {
      endpoint,
      transport: TransportKind::default(),
      timeout: Duration::from_secs(10),
      arrcon_path: PathBuf::from("ARRCON"),
      command_prefix: None,
    }
  }

  pub fn from_args(args: &ConnectionArgs) -> Result<Self> {
    let endpoint = Endpoint::new(&args.host, args.port, &args.password)?;
    Ok(Self {
      endpoint,
      transport: args.transport,
      timeout: Duration::from_millis(args.timeout_ms),
      arrcon_path: PathBuf::from(&args.arrcon_path),
      command_prefix: args.command_prefix,
    })
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;
  use crate::cli::Cli;

  #[test]
  fn explicit_arguments_flow_into_settings() {
    let cli = Cli::try_parse_from([
      "rcon-relay",
      "--host",
      "palworld.lan",
      "--port",
      "25576",
      "--password",
      "pw",
      "--timeout-ms",
      "2500",
      "--transport",
      "arrcon",
      "--command-prefix",
      "/",
      "save",
    ])
    .unwrap();

    let settings = Settings::from_args(&cli.connection).unwrap();
    assert_eq!(settings.endpoint.host(), "palworld.lan");
    assert_eq!(settings.endpoint.port(), 25_576);
    assert_eq!(settings.endpoint.password(), "pw");
    assert_eq!(settings.timeout, Duration::from_millis(2_500));
    assert_eq!(settings.transport, TransportKind::Arrcon);
    assert_eq!(settings.command_prefix, Some('/'));
  }

  #[test]
  fn new_uses_stock_defaults() {
    let endpoint = Endpoint::new("localhost", 25_575, "").unwrap();
    let settings = Settings::new(endpoint);
    assert_eq!(settings.transport, TransportKind::Source);
    assert_eq!(settings.timeout, Duration::from_secs(10));
    assert_eq!(settings.arrcon_path, PathBuf::from("ARRCON"));
  }
}
