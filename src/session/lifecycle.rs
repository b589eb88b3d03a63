//! Query lifecycle: submit, poll, fetch or finalize, close.
//!
//! ```text
//! Submitted -> Polling -> { Finished, RemoteFailed, Cancelled, Disconnected } -> Closed
//! ```
//!
//! Select-like queries and inserts share submission and polling and only diverge once the
//! remote state reaches `Finished` (see [`Completion`]). Every path that obtained a handle
//! closes it exactly once while a connection exists: through `close`, through
//! `finalize_insert`, or through cancel followed by close.
use std::{
    thread,
    time::{Duration, Instant},
};

use log::{debug, trace};

use crate::{
    error::RpcError,
    output::Output,
    rpc::{Connector, Query, QueryHandle, QueryService, RemoteState, ResultBatch},
};

use super::Session;

const FIXED_INSERT_POLL: Duration = Duration::from_millis(50);

/// How a query finishes once the service reports it as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Stream result rows back, then close.
    Fetch,
    /// Finalize the insert, which also releases the handle.
    Insert,
}

impl Completion {
    pub fn poll_schedule(&self) -> PollSchedule {
        match self {
            Completion::Fetch => PollSchedule::Adaptive,
            Completion::Insert => PollSchedule::Fixed(FIXED_INSERT_POLL),
        }
    }
}

/// Sleep between two state polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSchedule {
    /// 0.1s for the first 10s, 0.5s until a minute, then 1s.
    Adaptive,
    Fixed(Duration),
}

impl PollSchedule {
    pub fn interval(&self, elapsed: Duration) -> Duration {
        match self {
            PollSchedule::Adaptive if elapsed < Duration::from_secs(10) => {
                Duration::from_millis(100)
            }
            PollSchedule::Adaptive if elapsed < Duration::from_secs(60) => {
                Duration::from_millis(500)
            }
            PollSchedule::Adaptive => Duration::from_secs(1),
            PollSchedule::Fixed(interval) => *interval,
        }
    }
}

/// Terminal disposition of a lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Rows returned, or rows inserted.
    Finished(u64),
    Cancelled,
    RemoteException(String),
    TransportFailure,
    NotConnected,
}

/// Coarse classification of a [`QueryOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Finished,
    RemoteFailed,
    Cancelled,
    Disconnected,
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Finished(_))
    }

    pub fn terminal(&self) -> Terminal {
        match self {
            QueryOutcome::Finished(_) => Terminal::Finished,
            QueryOutcome::Cancelled => Terminal::Cancelled,
            QueryOutcome::RemoteException(_) => Terminal::RemoteFailed,
            QueryOutcome::TransportFailure | QueryOutcome::NotConnected => Terminal::Disconnected,
        }
    }

    fn from_error(err: &RpcError) -> Self {
        match err {
            RpcError::NotConnected => QueryOutcome::NotConnected,
            RpcError::StaleHandle => QueryOutcome::RemoteException(err.to_string()),
            RpcError::Remote(message) | RpcError::Status(message) => {
                QueryOutcome::RemoteException(message.clone())
            }
            RpcError::Transport(_) | RpcError::Unknown(_) => QueryOutcome::TransportFailure,
        }
    }
}

enum Polled {
    Finished,
    Done(QueryOutcome),
}

impl<C: Connector, O: Output> Session<C, O> {
    /// Runs one query to completion.
    ///
    /// Option values are sent verbatim with the query. Nothing escapes as an error; the
    /// user has already been told about any failure by the time this returns.
    pub fn execute_query(&mut self, text: &str, completion: Completion) -> QueryOutcome {
        let started = Instant::now();
        let query = Query {
            text: text.to_string(),
            configuration: self.options.configuration(),
        };
        self.verbose(&format!("Query: {text}"));

        let handle = match self.invoke("submit_query", |c| c.submit_query(&query)) {
            Ok(handle) => handle,
            Err(e) => return QueryOutcome::from_error(&e),
        };
        debug!("query submitted as {handle}");

        self.state.set_active(handle.clone());
        let outcome = self.drive(&handle, completion, started);
        self.state.clear_active();

        debug!("query {handle} ended: {outcome:?}");
        outcome
    }

    fn drive(
        &mut self,
        handle: &QueryHandle,
        completion: Completion,
        started: Instant,
    ) -> QueryOutcome {
        if self.interrupted() {
            return self.cancel_query(handle);
        }

        if let Polled::Done(outcome) = self.poll(handle, completion) {
            return outcome;
        }

        match completion {
            Completion::Fetch => self.fetch_all(handle, started),
            Completion::Insert => self.finalize_insert(handle, started),
        }
    }

    fn poll(&mut self, handle: &QueryHandle, completion: Completion) -> Polled {
        let schedule = completion.poll_schedule();
        let polling_since = Instant::now();

        loop {
            if self.interrupted() {
                return Polled::Done(self.cancel_query(handle));
            }

            match self.remote_state(handle) {
                RemoteState::Finished => return Polled::Finished,
                RemoteState::Exception => {
                    return Polled::Done(self.remote_failure(handle, completion));
                }
                state => trace!("{handle} is {state:?}"),
            }

            thread::sleep(schedule.interval(polling_since.elapsed()));
        }
    }

    /// Any failure to read the state counts as a remote exception.
    fn remote_state(&mut self, handle: &QueryHandle) -> RemoteState {
        self.invoke("get_state", |c| c.get_state(handle))
            .unwrap_or(RemoteState::Exception)
    }

    fn remote_failure(&mut self, handle: &QueryHandle, completion: Completion) -> QueryOutcome {
        self.output.error(match completion {
            Completion::Fetch => "Query aborted, unable to fetch data",
            Completion::Insert => "Remote error",
        });

        if !self.state.is_connected() {
            return QueryOutcome::TransportFailure;
        }

        let log = self
            .invoke("get_log", |c| c.get_log(&handle.log_context))
            .unwrap_or_default();
        if !log.trim().is_empty() {
            self.output.error(log.trim_end());
        }

        self.close_handle(handle);
        QueryOutcome::RemoteException(log)
    }

    fn fetch_all(&mut self, handle: &QueryHandle, started: Instant) -> QueryOutcome {
        self.verbose("Query finished, fetching results ...");
        let batch_size = self.config.fetch_batch_size.max(1);
        let mut pending: Vec<String> = Vec::new();
        let mut fetched: u64 = 0;

        loop {
            if self.interrupted() {
                self.close_handle(handle);
                return QueryOutcome::Cancelled;
            }

            let ResultBatch { rows, has_more } =
                match self.invoke("fetch", |c| c.fetch(handle, batch_size)) {
                    Ok(batch) => batch,
                    Err(e) => {
                        self.close_handle(handle);
                        return QueryOutcome::from_error(&e);
                    }
                };

            if self.interrupted() {
                self.close_handle(handle);
                return QueryOutcome::Cancelled;
            }

            fetched += rows.len() as u64;
            pending.extend(rows);
            if !pending.is_empty() && (pending.len() >= batch_size || !has_more) {
                self.output.rows(&pending);
                pending.clear();
            }

            if !has_more {
                break;
            }
        }

        self.verbose(&format!(
            "Returned {fetched} row(s) in {:.2}s",
            started.elapsed().as_secs_f64()
        ));
        self.close_handle(handle);
        QueryOutcome::Finished(fetched)
    }

    /// Finalizing an insert releases its handle, so no close follows.
    fn finalize_insert(&mut self, handle: &QueryHandle, started: Instant) -> QueryOutcome {
        let result = self.invoke("finalize_insert", |c| c.finalize_insert(handle));
        if self.interrupted() {
            return QueryOutcome::Cancelled;
        }

        match result {
            Ok(inserted) => {
                let rows = inserted.total_rows();
                self.verbose(&format!(
                    "Inserted {rows} rows in {:.2}s",
                    started.elapsed().as_secs_f64()
                ));
                QueryOutcome::Finished(rows)
            }
            Err(e) => QueryOutcome::from_error(&e),
        }
    }

    /// Best-effort close. Failures have already been surfaced by the gateway and never
    /// change the outcome of the query.
    pub(crate) fn close_handle(&mut self, handle: &QueryHandle) -> bool {
        if !self.state.is_connected() {
            debug!("not closing {handle}, connection is gone");
            return false;
        }

        match self.invoke("close", |c| c.close(handle)) {
            Ok(_) => true,
            Err(e) => {
                debug!("close of {handle} failed: {e}");
                false
            }
        }
    }
}
