pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod options;
pub mod output;
pub mod protocol;
pub mod rpc;
pub mod session;
pub mod shell;

#[cfg(test)]
mod testing;

pub use cli::prompt;
pub use command::{Command, CommandError};
pub use config::SessionConfig;
pub use error::{ErrorKind, RpcError, RpcFault};
pub use output::{Console, Output};
pub use protocol::TcpConnector;
pub use session::{Completion, Interrupt, QueryOutcome, Session};
pub use shell::{CommandStatus, Shell, ShellOptions};
