use std::fmt;

use crate::classify::ErrorKind;
use crate::error::{RconError, Result};

/// Address and credentials of a single RCON server.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
  host: String,
  port: u16,
  password: String,
}

impl Endpoint {
  /// Build an endpoint, rejecting an empty host or port `0`.
  pub fn new(
    host: impl Into<String>,
    port: u16,
    password: impl Into<String>,
  ) -> Result<Self> {
    let host = host.into();
    if host.trim().is_empty() {
      return Err(RconError::new(
        ErrorKind::HostResolution,
        "RCON host must not be empty",
      ));
    }
    if port == 0 {
      return Err(RconError::new(
        ErrorKind::Connection,
        "RCON port must be between 1 and 65535",
      ));
    }

    Ok(Self {
      host,
      port,
      password: password.into(),
    })
  }

  pub fn host(&self) -> &str {
    &self.host
  }

  pub fn port(&self) -> u16 {
    self.port
  }

  pub fn password(&self) -> &str {
    &self.password
  }

  /// `host:port`, suitable for logs.
  pub fn address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

impl fmt::Debug for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Endpoint")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("password", &"<redacted>")
      .finish()
  }
}
