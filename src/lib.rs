pub mod classify;
pub mod cli;
pub mod command;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod transport;
pub mod ui;

pub use classify::{ErrorKind, classify};
pub use cli::Cli;
pub use command::{CommandRequest, RconCommand};
pub use config::Settings;
pub use self::core::run;
pub use dispatch::{Reply, dispatch, execute};
pub use endpoint::Endpoint;
pub use error::RconError;
pub use runtime::Runtime;
pub use transport::{RconTransport, Session, TransportKind};
