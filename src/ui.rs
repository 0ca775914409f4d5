use owo_colors::OwoColorize;
use tokio::io::{self, AsyncWriteExt, Stdout};

use crate::dispatch::Reply;

/// Render the interactive prompt prefix to the provided stdout handle.
pub async fn render_prompt(
  stdout: &mut Stdout,
  use_color: bool,
) -> io::Result<()> {
  let prompt = if use_color {
    format!("{} ", "rcon>".bright_magenta().bold())
  } else {
    "rcon> ".to_owned()
  };

  stdout.write_all(prompt.as_bytes()).await?;
  stdout.flush().await
}

/// Print a reply the way a chat front-end would show it.
pub fn render_reply(reply: &Reply, use_color: bool) {
  println!("{}", format_reply(reply, use_color));
}

/// Format a reply, colouring the first line by outcome.
pub fn format_reply(reply: &Reply, use_color: bool) -> String {
  let text = reply.to_string();
  if !use_color {
    return text;
  }

  let (head, rest) = match text.split_once('\n') {
    Some((head, rest)) => (head, Some(rest)),
    None => (text.as_str(), None),
  };

  let head = match reply {
    Reply::Success(_) => format!("{}", head.green().bold()),
    Reply::Failure { .. } | Reply::Invalid(_) => {
      format!("{}", head.red().bold())
    }
  };

  match rest {
    Some(rest) => format!("{head}\n{}", rest.cyan()),
    None => head,
  }
}
