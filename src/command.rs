//! High-level shell commands.
//!
//! This module defines the [`Command`] enum, which a sanitised input line is parsed into
//! before the [`Shell`](crate::shell::Shell) acts on it. Parsing is purely syntactic; no
//! command touches the session here.
//!
//! # Overview
//!
//! - `Connect(String)`: Connect to `host[:port]`.
//! - `Query(String)`: `select`, `use`, `show` and `describe`; results are fetched.
//! - `Insert(String)`: `insert`; rows appended are counted, nothing is fetched.
//! - `Explain(String)`: Print the service's plan for a query.
//! - `Refresh`: Reload the service's catalog.
//! - `Set(Option<String>)`: List the query options, or assign one with `NAME=value`.
//! - `Version`, `Quit`, `Empty`.
//!
//! # Example
//! ```rust
//! use qshell::Command;
//!
//! let cmd: Command = "SELECT * FROM t;".try_into().unwrap();
//! assert_eq!(cmd, Command::Query("select * FROM t".to_string()));
//! ```
use thiserror::Error;

/// List of possible error that a command can throw.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("invalid '{command}' command, {reason}")]
    InvalidCommandArguments { command: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect(String),
    Query(String),
    Insert(String),
    Explain(String),
    Refresh,
    Set(Option<String>),
    Version,
    Quit,
    Empty,
}

/// Lower-cases the leading keyword and strips trailing semicolons. A bare `EOF`
/// becomes `quit`.
pub fn sanitise(line: &str) -> String {
    let line = line.trim();
    if line == "EOF" {
        return "quit".to_string();
    }

    let sanitised = match line.split_once(' ') {
        Some((keyword, rest)) => format!("{} {}", keyword.to_lowercase(), rest),
        None => line.to_lowercase(),
    };
    sanitised.trim_end_matches(';').trim_end().to_string()
}

impl TryFrom<&str> for Command {
    type Error = CommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let line = sanitise(value);
        let (keyword, rest) = match line.split_once(' ') {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line.as_str(), ""),
        };

        match keyword {
            "" => Ok(Command::Empty),
            "quit" | "exit" => Ok(Command::Quit),
            "version" => Ok(Command::Version),
            "refresh" => Ok(Command::Refresh),
            "connect" => {
                let parts = rest.split_whitespace().collect::<Vec<&str>>();
                if parts.len() != 1 {
                    return Err(CommandError::InvalidCommandArguments {
                        command: "connect".to_string(),
                        reason: "takes exactly one argument: <hostname:port> of the service to connect to"
                            .to_string(),
                    });
                }
                Ok(Command::Connect(parts[0].to_string()))
            }
            "set" if rest.is_empty() => Ok(Command::Set(None)),
            "set" => Ok(Command::Set(Some(rest.to_string()))),
            "explain" if rest.is_empty() => Err(CommandError::InvalidCommandArguments {
                command: "explain".to_string(),
                reason: "requires a query. Example: explain select * from t".to_string(),
            }),
            "explain" => Ok(Command::Explain(rest.to_string())),
            "select" | "use" | "show" | "describe" => Ok(Command::Query(line.clone())),
            "insert" => Ok(Command::Insert(line.clone())),
            _ => Err(CommandError::UnrecognizedCommand(line.clone())),
        }
    }
}
