//! Valve/Source RCON over TCP.
//!
//! Every packet is `size | id | type | body | NUL | NUL`, integers being
//! little-endian `i32` and `size` counting everything after itself. The
//! server answers a rejected `SERVERDATA_AUTH` with id `-1`.

use std::time::Duration;

use tokio::io::{
  AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter,
};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use super::{RconTransport, connect_tcp, with_timeout};
use crate::classify::ErrorKind;
use crate::endpoint::Endpoint;
use crate::error::{RconError, Result};

pub const SERVERDATA_AUTH: i32 = 3;
pub const SERVERDATA_AUTH_RESPONSE: i32 = 2;
pub const SERVERDATA_EXECCOMMAND: i32 = 2;
pub const SERVERDATA_RESPONSE_VALUE: i32 = 0;

const AUTH_FAILED_ID: i32 = -1;
/// id + type + two terminators.
const MIN_PACKET_SIZE: i32 = 10;
const MAX_PACKET_SIZE: i32 = 64 * 1024;
/// Largest body a server accepts from a client.
pub const MAX_SERVERBOUND_BODY: usize = 4096 - 10;

/// One decoded RCON packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
  pub id: i32,
  pub kind: i32,
  pub body: String,
}

impl Packet {
  pub fn new(id: i32, kind: i32, body: impl Into<String>) -> Self {
    Self {
      id,
      kind,
      body: body.into(),
    }
  }

  /// Serialise the packet, size prefix included.
  pub fn encode(&self) -> Result<Vec<u8>> {
    let body = self.body.as_bytes();
    if body.len() > MAX_SERVERBOUND_BODY {
      return Err(RconError::transport(format!(
        "packet body of {} bytes exceeds the {MAX_SERVERBOUND_BODY} byte limit",
        body.len()
      )));
    }

    let size = i32::try_from(body.len() + 10).map_err(|_| {
      RconError::transport("packet size does not fit the length prefix")
    })?;
    let mut buf = Vec::with_capacity(body.len() + 14);
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&self.id.to_le_bytes());
    buf.extend_from_slice(&self.kind.to_le_bytes());
    buf.extend_from_slice(body);
    buf.extend_from_slice(&[0, 0]);
    Ok(buf)
  }

  /// Decode the bytes following the size prefix.
  ///
  /// Trailing terminators are stripped leniently since some servers send
  /// only one.
  pub fn decode(frame: &[u8]) -> Result<Self> {
    if frame.len() < 8 {
      return Err(RconError::transport(format!(
        "packet of {} bytes is too short",
        frame.len()
      )));
    }

    let id = i32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
    let kind = i32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]);
    let body = String::from_utf8_lossy(&frame[8..])
      .trim_end_matches('\0')
      .to_string();

    Ok(Self { id, kind, body })
  }
}

/// Read one size-prefixed packet.
pub(crate) async fn read_packet<R>(
  reader: &mut R,
  deadline: Duration,
) -> Result<Packet>
where
  R: AsyncRead + Unpin,
{
  let size =
    with_timeout(deadline, reader.read_i32_le(), "reading packet size")
      .await?;

  if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&size) {
    return Err(RconError::transport(format!(
      "protocol violation: packet size {size} out of range"
    )));
  }

  let mut frame = vec![0u8; size as usize];
  with_timeout(deadline, reader.read_exact(&mut frame), "reading packet body")
    .await?;

  let packet = Packet::decode(&frame)?;
  tracing::trace!(id = packet.id, kind = packet.kind, "<-- packet");
  Ok(packet)
}

/// Client speaking the Source RCON protocol.
#[derive(Debug)]
pub struct SourceClient {
  reader: BufReader<OwnedReadHalf>,
  writer: BufWriter<OwnedWriteHalf>,
  timeout: Duration,
  next_id: i32,
  closed: bool,
}

impl SourceClient {
  /// Connect and authenticate with the endpoint's password.
  pub async fn connect(endpoint: &Endpoint, deadline: Duration) -> Result<Self> {
    let stream = connect_tcp(endpoint, deadline).await?;
    let (read_half, write_half) = stream.into_split();

    let mut client = Self {
      reader: BufReader::new(read_half),
      writer: BufWriter::new(write_half),
      timeout: deadline,
      next_id: 0,
      closed: false,
    };

    if let Err(err) = client.authenticate(endpoint.password()).await {
      if let Err(close_err) = client.close().await {
        tracing::debug!(error = %close_err, "failed to close after auth failure");
      }
      return Err(err);
    }

    Ok(client)
  }

  pub fn is_closed(&self) -> bool {
    self.closed
  }

  async fn authenticate(&mut self, password: &str) -> Result<()> {
    let id = self.allocate_id();
    self
      .write_packet(&Packet::new(id, SERVERDATA_AUTH, password), "AUTH <redacted>")
      .await?;

    loop {
      let packet = read_packet(&mut self.reader, self.timeout).await?;
      match packet.kind {
        SERVERDATA_AUTH_RESPONSE if packet.id == AUTH_FAILED_ID => {
          return Err(RconError::new(
            ErrorKind::Auth,
            "server rejected the RCON password",
          ));
        }
        SERVERDATA_AUTH_RESPONSE if packet.id == id => {
          tracing::debug!("authentication accepted");
          return Ok(());
        }
        // Servers echo an empty RESPONSE_VALUE ahead of the auth result.
        SERVERDATA_RESPONSE_VALUE => continue,
        other => {
          return Err(RconError::transport(format!(
            "unexpected packet (id {}, type {other}) during authentication",
            packet.id
          )));
        }
      }
    }
  }

  fn allocate_id(&mut self) -> i32 {
    self.next_id = self.next_id.wrapping_add(1);
    if self.next_id <= 0 {
      self.next_id = 1;
    }
    self.next_id
  }

  async fn write_packet(&mut self, packet: &Packet, label: &str) -> Result<()> {
    let bytes = packet.encode()?;
    tracing::debug!(id = packet.id, "--> {}", label);

    with_timeout(
      self.timeout,
      self.writer.write_all(&bytes),
      format!("writing `{label}` to socket"),
    )
    .await?;

    with_timeout(
      self.timeout,
      self.writer.flush(),
      "flushing packet to socket",
    )
    .await
  }
}

impl RconTransport for SourceClient {
  /// Only the first RESPONSE_VALUE packet of a reply is returned; any
  /// continuation packets of a split reply are skipped as stale.
  async fn exchange(&mut self, payload: &str) -> Result<String> {
    if self.closed {
      return Err(RconError::transport("connection already closed"));
    }
    if payload.contains('\0') {
      return Err(RconError::transport("command must not contain NUL bytes"));
    }

    let id = self.allocate_id();
    self
      .write_packet(&Packet::new(id, SERVERDATA_EXECCOMMAND, payload), payload)
      .await?;

    loop {
      let packet = read_packet(&mut self.reader, self.timeout).await?;
      if packet.id == AUTH_FAILED_ID {
        return Err(RconError::new(
          ErrorKind::Auth,
          "server reports the session is not authenticated",
        ));
      }
      if packet.kind == SERVERDATA_RESPONSE_VALUE && packet.id == id {
        return Ok(packet.body);
      }
      tracing::trace!(id = packet.id, "skipping stale packet");
    }
  }

  async fn close(&mut self) -> Result<()> {
    if self.closed {
      return Ok(());
    }
    self.closed = true;

    if let Err(err) = self.writer.shutdown().await {
      tracing::debug!(error = %err, "failed to shut down RCON socket");
    }
    Ok(())
  }
}
