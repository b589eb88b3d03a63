//! Command dispatch on top of a [`Session`].
use std::collections::VecDeque;

use log::debug;

use crate::{
    command::Command,
    output::Output,
    rpc::{Connector, ServerAddress},
    session::{Completion, Session},
};

/// Result of one shell command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
    Quit,
}

impl From<bool> for CommandStatus {
    fn from(value: bool) -> Self {
        if value {
            CommandStatus::Success
        } else {
            CommandStatus::Failure
        }
    }
}

/// Commands issued automatically after every successful connect.
#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    pub refresh_after_connect: bool,
    pub default_db: Option<String>,
}

pub struct Shell<C: Connector, O: Output> {
    session: Session<C, O>,
    options: ShellOptions,
    queue: VecDeque<String>,
}

impl<C: Connector, O: Output> Shell<C, O> {
    pub fn new(session: Session<C, O>, options: ShellOptions) -> Self {
        Self {
            session,
            options,
            queue: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &Session<C, O> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<C, O> {
        &mut self.session
    }

    pub fn prompt(&self) -> String {
        self.session.prompt()
    }

    /// Next command queued by a previous `connect`.
    pub fn next_queued(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Parses and runs one line of input.
    pub fn execute(&mut self, line: &str) -> CommandStatus {
        self.session.begin_command();

        let cmd = match Command::try_from(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                self.session.output_mut().error(&e.to_string());
                return CommandStatus::Failure;
            }
        };
        debug!("executing {cmd:?}");

        match cmd {
            Command::Empty => CommandStatus::Success,
            Command::Quit => {
                self.session.verbose("Goodbye");
                self.session.disconnect();
                CommandStatus::Quit
            }
            Command::Version => {
                self.session
                    .output_mut()
                    .info(&format!("Build version: {}", env!("CARGO_PKG_VERSION")));
                CommandStatus::Success
            }
            Command::Connect(address) => self.connect(&address).into(),
            Command::Query(text) => self
                .session
                .execute_query(&text, Completion::Fetch)
                .is_success()
                .into(),
            Command::Insert(text) => self
                .session
                .execute_query(&text, Completion::Insert)
                .is_success()
                .into(),
            Command::Explain(text) => self.session.explain(&text).into(),
            Command::Refresh => self.session.refresh().into(),
            Command::Set(assignment) => self.set(assignment).into(),
        }
    }

    fn connect(&mut self, address: &str) -> bool {
        let default_port = self.session.config().default_port;
        let address = match ServerAddress::parse_with_default(address, default_port) {
            Ok(address) => address,
            Err(e) => {
                self.session.output_mut().error(&e.to_string());
                return false;
            }
        };

        if !self.session.connect(&address) {
            return false;
        }

        if self.options.refresh_after_connect {
            self.queue.push_back("refresh".to_string());
        }
        if let Some(db) = &self.options.default_db {
            self.queue.push_back(format!("use {db}"));
        }
        true
    }

    fn set(&mut self, assignment: Option<String>) -> bool {
        let Some(assignment) = assignment else {
            self.session.verbose("Query options:");
            let listing = self.session.options().to_string();
            self.session.output_mut().info(&listing);
            return true;
        };

        match self.session.options_mut().assign(&assignment) {
            Ok(message) => {
                self.session.verbose(&message);
                true
            }
            Err(e) => {
                self.session.output_mut().error(&e.to_string());
                false
            }
        }
    }
}
