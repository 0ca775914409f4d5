use crate::{Cli, run};
use owo_colors::OwoColorize;

/// High-level wrapper that executes one relay invocation and reports errors uniformly.
pub struct Runtime {
  cli: Cli,
}

impl Runtime {
  /// Construct a new [`Runtime`] from parsed CLI arguments.
  #[must_use]
  pub fn new(cli: Cli) -> Self {
    Self { cli }
  }

  /// Execute the relay and return the desired process exit code.
  ///
  /// Replies already carry their own status (`0` or `2`). Setup errors, such
  /// as a console session that cannot be opened, are logged in a colourful,
  /// human-friendly format and coerced to exit code `1`.
  pub async fn execute(self) -> i32 {
    let use_color = !self.cli.plain;
    match run(self.cli).await {
      Ok(code) => code,
      Err(err) => {
        log_error_chain(&err, use_color);
        1
      }
    }
  }
}

fn log_error_chain(err: &anyhow::Error, use_color: bool) {
  if use_color {
    eprintln!("{} {}", "error:".red().bold(), err.to_string().red().bold());
  } else {
    eprintln!("error: {err}");
  }

  for cause in err.chain().skip(1) {
    if use_color {
      eprintln!("  {} {}", "↳".red(), cause);
    } else {
      eprintln!("  caused by: {cause}");
    }
  }
}
