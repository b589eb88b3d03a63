//! Query session protocol engine.
//!
//! A [`Session`] owns everything one interactive session needs: the connection, the
//! [`SessionState`], the query options and the output sink. It drives one query at a
//! time from submission to cleanup on the calling thread.
//!
//! # Overview
//!
//! - `connection`: Opens and probes the single connection ([`ConnectionManager`]).
//! - `gateway`: Every RPC goes through `Session::invoke`, which checks connectivity and
//!   classifies faults.
//! - `lifecycle`: Submit, poll with backoff, fetch or finalize, close.
//! - `cancel`: The [`Interrupt`] flag and the cancel-and-cleanup path.
//!
//! # Concurrency
//!
//! There is a single thread of control. The only thing shared with another thread is
//! the [`Interrupt`], which a signal handler may set at any time; the session reads it
//! at suspension points and never interrupts an RPC in flight.
mod cancel;
mod connection;
mod gateway;
mod lifecycle;
mod state;

pub use cancel::Interrupt;
pub use connection::ConnectionManager;
pub use lifecycle::{Completion, PollSchedule, QueryOutcome, Terminal};
pub use state::{DISCONNECTED_PROMPT, SessionState};

use crate::{
    config::SessionConfig,
    options::QueryOptions,
    output::Output,
    rpc::{Connector, Query, QueryService},
};

pub struct Session<C: Connector, O: Output> {
    state: SessionState,
    connections: ConnectionManager<C>,
    options: QueryOptions,
    config: SessionConfig,
    output: O,
}

impl<C: Connector, O: Output> Session<C, O> {
    pub fn new(connector: C, output: O, config: SessionConfig, interrupt: Interrupt) -> Self {
        Self {
            state: SessionState::new(interrupt),
            connections: ConnectionManager::new(connector),
            options: QueryOptions::default(),
            config,
            output,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn prompt(&self) -> String {
        self.state.prompt()
    }

    /// A handle to the interrupt flag, for the signal source.
    pub fn interrupt(&self) -> Interrupt {
        self.state.interrupt().clone()
    }

    /// Called at the start of every top-level command so a stale interrupt cannot leak
    /// into the next query.
    pub fn begin_command(&mut self) {
        self.state.interrupt().clear();
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Prints `message` only in verbose mode.
    pub fn verbose(&mut self, message: &str) {
        if self.config.verbose {
            self.output.info(message);
        }
    }

    /// Prints the service's plan for `text`.
    pub fn explain(&mut self, text: &str) -> bool {
        let query = Query {
            text: text.to_string(),
            configuration: self.options.configuration(),
        };
        self.output.info(&format!("Explain query: {text}"));

        match self.invoke("explain", |c| c.explain(&query)) {
            Ok(explanation) => {
                self.output.info(&explanation.textual);
                true
            }
            Err(_) => false,
        }
    }

    /// Asks the service to reload its catalog.
    pub fn refresh(&mut self) -> bool {
        match self.invoke("reset_catalog", |c| c.reset_catalog()) {
            Ok(_) => {
                self.output.info("Successfully refreshed catalog");
                true
            }
            Err(_) => false,
        }
    }
}
