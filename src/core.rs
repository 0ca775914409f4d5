use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
  cli::{Action, Cli},
  command::{self, RconCommand},
  config::Settings,
  dispatch::{self, Reply},
  logging,
  transport::{RconTransport, Session},
  ui,
};

/// Exit status for a reply the server refused or the relay rejected.
pub const EXIT_COMMAND_FAILED: i32 = 2;

/// Orchestrate a single relay invocation.
pub async fn run(cli: Cli) -> Result<i32> {
  let use_color_stdout = !cli.plain && io::stdout().is_terminal();
  let use_color_logs = !cli.plain && io::stderr().is_terminal();

  logging::init(cli.verbose, use_color_logs);

  let settings = Settings::from_args(&cli.connection)
    .context("invalid RCON connection settings")?;

  tracing::debug!(
    transport = %settings.transport,
    address = %settings.endpoint.address(),
    "relay configured"
  );

  match action_command(cli.action) {
    Some(command) => {
      let reply = dispatch::dispatch(&settings, &command).await;
      ui::render_reply(&reply, use_color_stdout);
      Ok(exit_code(&reply))
    }
    None => run_console(&settings, use_color_stdout).await,
  }
}

/// Map a CLI action to its server command; `None` means the console.
pub fn action_command(action: Action) -> Option<RconCommand> {
  let command = match action {
    Action::Shutdown { seconds, reason } => {
      RconCommand::Shutdown { seconds, reason }
    }
    Action::Kill => RconCommand::Kill,
    Action::Broadcast { message } => RconCommand::Broadcast { message },
    Action::Save => RconCommand::Save,
    Action::Info => RconCommand::Info,
    Action::ShowPlayers => RconCommand::ShowPlayers,
    Action::Command { words } => RconCommand::Raw(words.join(" ")),
    Action::Console => return None,
  };
  Some(command)
}

fn exit_code(reply: &Reply) -> i32 {
  if reply.is_success() {
    0
  } else {
    EXIT_COMMAND_FAILED
  }
}

async fn run_console(settings: &Settings, use_color: bool) -> Result<i32> {
  let mut session = Session::open(settings).await.with_context(|| {
    format!(
      "failed to open RCON session to {}",
      settings.endpoint.address()
    )
  })?;

  tracing::info!(transport = %session.kind(), "console session open");

  let outcome = console_loop(&mut session, settings, use_color).await;

  if let Err(err) = session.close().await {
    tracing::debug!(error = %err, "failed to close RCON session");
  }

  outcome
}

async fn console_loop(
  session: &mut Session,
  settings: &Settings,
  use_color: bool,
) -> Result<i32> {
  let mut stdin = BufReader::new(tokio::io::stdin());
  let mut stdout = tokio::io::stdout();
  let mut input = String::new();
  let mut exit_code = 0;

  loop {
    ui::render_prompt(&mut stdout, use_color)
      .await
      .context("failed to render prompt")?;

    input.clear();
    let bytes_read = stdin
      .read_line(&mut input)
      .await
      .context("failed to read line from stdin")?;

    if bytes_read == 0 {
      println!();
      tracing::info!("stdin closed; terminating session");
      break;
    }

    if command::is_exit_command(&input) {
      break;
    }

    let Some(line) = command::sanitize(&input) else {
      continue;
    };

    let reply = dispatch::execute(
      session,
      &RconCommand::Raw(line),
      settings.command_prefix,
    )
    .await;
    ui::render_reply(&reply, use_color);
    if !reply.is_success() {
      exit_code = EXIT_COMMAND_FAILED;
    }
  }

  Ok(exit_code)
}
