//! Interchangeable RCON transports behind one capability trait.
//!
//! Every transport opens against an [`Endpoint`], exchanges one command at a
//! time and releases its resources on [`RconTransport::close`]. Nothing is
//! multiplexed: a session has at most one command in flight, so no request
//! correlation beyond the Source packet id is needed.

pub mod source;
pub mod subprocess;

use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout as await_timeout;

pub use source::SourceClient;
pub use subprocess::SubprocessClient;

use crate::classify::{ErrorKind, classify};
use crate::config::Settings;
use crate::endpoint::Endpoint;
use crate::error::{RconError, Result};

/// The `{open, send, close}` capability every RCON client provides.
///
/// Opening is transport specific (see [`Session::open`]); once open, callers
/// only ever talk to this trait.
#[allow(async_fn_in_trait)]
pub trait RconTransport {
  /// Write one command and return the raw reply text, unclassified.
  async fn exchange(&mut self, payload: &str) -> Result<String>;

  /// Release the connection or process. Calling it twice is a no-op.
  async fn close(&mut self) -> Result<()>;

  /// Exchange one command and reject replies carrying a failure marker.
  async fn send(&mut self, command: &str) -> Result<String> {
    let raw = self.exchange(command).await?;
    if let Err(kind) = classify(Some(raw.as_str())) {
      return Err(RconError::new(
        kind,
        format!("server reply to `{command}` signalled {kind}"),
      ));
    }
    Ok(raw)
  }
}

/// Supported RCON transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportKind {
  /// Valve/Source RCON packets over TCP.
  #[default]
  Source,
  /// One external ARRCON process per command.
  Arrcon,
}

impl TransportKind {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Source => "source",
      Self::Arrcon => "arrcon",
    }
  }
}

impl fmt::Display for TransportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Error returned when parsing a [`TransportKind`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported transport `{input}` (expected source or arrcon)")]
pub struct ParseTransportError {
  input: String,
}

impl ParseTransportError {
  pub fn input(&self) -> &str {
    &self.input
  }
}

impl FromStr for TransportKind {
  type Err = ParseTransportError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase();
    match normalized.as_str() {
      "source" | "src" => Ok(Self::Source),
      "arrcon" | "subprocess" => Ok(Self::Arrcon),
      _ => Err(ParseTransportError {
        input: s.to_string(),
      }),
    }
  }
}

/// An open RCON session over whichever transport the settings select.
#[derive(Debug)]
pub enum Session {
  Source(SourceClient),
  Subprocess(SubprocessClient),
}

impl Session {
  /// Establish the transport and run its authentication handshake.
  ///
  /// Fails before any command is written if the host does not resolve, the
  /// port is unreachable, or the password is rejected.
  pub async fn open(settings: &Settings) -> Result<Self> {
    let endpoint = &settings.endpoint;
    tracing::debug!(
      transport = %settings.transport,
      address = %endpoint.address(),
      "opening RCON session"
    );

    let session = match settings.transport {
      TransportKind::Source => {
        Self::Source(SourceClient::connect(endpoint, settings.timeout).await?)
      }
      TransportKind::Arrcon => Self::Subprocess(SubprocessClient::new(
        settings.arrcon_path.clone(),
        endpoint.clone(),
        settings.timeout,
      )),
    };

    Ok(session)
  }

  pub fn kind(&self) -> TransportKind {
    match self {
      Self::Source(_) => TransportKind::Source,
      Self::Subprocess(_) => TransportKind::Arrcon,
    }
  }
}

impl RconTransport for Session {
  async fn exchange(&mut self, payload: &str) -> Result<String> {
    match self {
      Self::Source(client) => client.exchange(payload).await,
      Self::Subprocess(client) => client.exchange(payload).await,
    }
  }

  async fn close(&mut self) -> Result<()> {
    match self {
      Self::Source(client) => client.close().await,
      Self::Subprocess(client) => client.close().await,
    }
  }
}

/// Run an I/O future under a deadline, mapping both failure modes to
/// [`ErrorKind::Transport`].
pub(crate) async fn with_timeout<F, T>(
  duration: Duration,
  future: F,
  context: impl Into<String>,
) -> Result<T>
where
  F: Future<Output = io::Result<T>>,
{
  let context = context.into();
  match await_timeout(duration, future).await {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(err)) => Err(RconError::transport(context).with_source(err)),
    Err(_) => Err(RconError::transport(format!(
      "{context} timed out after {} ms",
      duration.as_millis()
    ))),
  }
}

/// Resolve the endpoint and open a TCP stream to the first address that
/// accepts.
pub(crate) async fn connect_tcp(
  endpoint: &Endpoint,
  deadline: Duration,
) -> Result<TcpStream> {
  let host = endpoint.host();
  let addrs: Vec<SocketAddr> =
    match await_timeout(deadline, lookup_host((host, endpoint.port()))).await
    {
      Ok(Ok(addrs)) => addrs.collect(),
      Ok(Err(err)) => {
        return Err(
          RconError::new(
            ErrorKind::HostResolution,
            format!("could not resolve `{host}`"),
          )
          .with_source(err),
        );
      }
      Err(_) => {
        return Err(RconError::new(
          ErrorKind::HostResolution,
          format!("resolving `{host}` timed out"),
        ));
      }
    };

  if addrs.is_empty() {
    return Err(RconError::new(
      ErrorKind::HostResolution,
      format!("`{host}` resolved to no addresses"),
    ));
  }

  let mut last_error = None;
  for addr in addrs {
    match await_timeout(deadline, TcpStream::connect(addr)).await {
      Ok(Ok(stream)) => {
        stream.set_nodelay(true).map_err(|err| {
          RconError::transport("failed to configure socket").with_source(err)
        })?;
        tracing::debug!(%addr, "connected");
        return Ok(stream);
      }
      Ok(Err(err)) => {
        tracing::debug!(%addr, error = %err, "connect attempt failed");
        last_error = Some(err);
      }
      Err(_) => tracing::debug!(%addr, "connect attempt timed out"),
    }
  }

  let error = RconError::new(
    ErrorKind::Connection,
    format!("could not connect to {}", endpoint.address()),
  );
  Err(match last_error {
    Some(source) => error.with_source(source),
    None => error,
  })
}
