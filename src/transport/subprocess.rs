//! Relay commands through the external ARRCON binary.
//!
//! No connection is kept: each exchange spawns
//! `ARRCON -H <host> -P <port> -p <password> <command>`, reads its stdout to
//! the end and kills the child. ARRCON reports failures as text on stdout,
//! which is why its output must go through the classifier.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::{RconTransport, with_timeout};
use crate::endpoint::Endpoint;
use crate::error::{RconError, Result};

#[derive(Debug)]
pub struct SubprocessClient {
  program: PathBuf,
  endpoint: Endpoint,
  timeout: Duration,
  closed: bool,
}

impl SubprocessClient {
  pub fn new(
    program: impl Into<PathBuf>,
    endpoint: Endpoint,
    timeout: Duration,
  ) -> Self {
    Self {
      program: program.into(),
      endpoint,
      timeout,
      closed: false,
    }
  }

  fn command(&self, payload: &str) -> Command {
    let mut command = Command::new(&self.program);
    command
      .arg("-H")
      .arg(self.endpoint.host())
      .arg("-P")
      .arg(self.endpoint.port().to_string())
      .arg("-p")
      .arg(self.endpoint.password())
      .arg(payload)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::null())
      .kill_on_drop(true);
    command
  }
}

impl RconTransport for SubprocessClient {
  async fn exchange(&mut self, payload: &str) -> Result<String> {
    if self.closed {
      return Err(RconError::transport("session already closed"));
    }

    tracing::debug!(
      program = %self.program.display(),
      address = %self.endpoint.address(),
      "--> {} (via subprocess)",
      payload
    );

    let mut child = self.command(payload).spawn().map_err(|err| {
      RconError::transport(format!(
        "failed to spawn `{}`",
        self.program.display()
      ))
      .with_source(err)
    })?;

    let mut stdout = child
      .stdout
      .take()
      .ok_or_else(|| RconError::transport("child stdout was not captured"))?;

    let mut output = Vec::new();
    let read = with_timeout(
      self.timeout,
      stdout.read_to_end(&mut output),
      "reading subprocess output",
    )
    .await;

    if let Err(err) = child.kill().await {
      tracing::trace!(error = %err, "subprocess already exited");
    }

    read?;
    Ok(String::from_utf8_lossy(&output).into_owned())
  }

  async fn close(&mut self) -> Result<()> {
    self.closed = true;
    Ok(())
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::classify::ErrorKind;

  fn client(program: &str) -> SubprocessClient {
    let endpoint = Endpoint::new("rcon.local", 25_575, "pw").unwrap();
    SubprocessClient::new(program, endpoint, Duration::from_secs(5))
  }

  #[tokio::test]
  async fn passes_endpoint_and_command_as_arguments() {
    let mut client = client("echo");
    let output = client.send("Broadcast \"hi\"").await.unwrap();
    assert_eq!(output, "-H rcon.local -P 25575 -p pw Broadcast \"hi\"\n");
  }

  #[tokio::test]
  async fn silent_process_is_transport_error() {
    let mut client = client("true");
    let err = client.send("Save").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
  }

  #[tokio::test]
  async fn missing_binary_is_transport_error() {
    let mut client = client("/nonexistent/ARRCON");
    let err = client.send("Info").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
  }

  #[tokio::test]
  async fn hung_process_is_killed_after_the_timeout() {
    use std::os::unix::fs::PermissionsExt;

    let script = std::env::temp_dir()
      .join(format!("rcon-relay-hang-{}.sh", std::process::id()));
    std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
      .unwrap();

    let endpoint = Endpoint::new("rcon.local", 25_575, "pw").unwrap();
    let mut client =
      SubprocessClient::new(&script, endpoint, Duration::from_millis(300));

    let started = std::time::Instant::now();
    let result = client.send("Info").await;
    let elapsed = started.elapsed();
    std::fs::remove_file(&script).ok();

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.detail().contains("timed out"), "{err}");
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
  }

  #[tokio::test]
  async fn closed_client_refuses_commands() {
    let mut client = client("echo");
    client.close().await.unwrap();
    client.close().await.unwrap();
    assert!(client.send("Info").await.is_err());
  }
}
