//! Cooperative cancellation.
//!
//! An [`Interrupt`] is shared between the session and an asynchronous signal source
//! (the binary installs a Ctrl-C handler that sets it). The lifecycle reads it only at
//! suspension points: right after submission, before every poll, and around every fetch.
//! An RPC that is already in flight always completes first.
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use log::{debug, info};

use crate::{
    error::RpcError,
    output::Output,
    rpc::{Connector, QueryHandle, QueryService},
};

use super::{QueryOutcome, Session};

/// Thread-safe flag set by a signal handler and polled by the session.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl<C: Connector, O: Output> Session<C, O> {
    pub(crate) fn interrupted(&self) -> bool {
        self.state.interrupt().is_set()
    }

    /// Cancels `handle` remotely, then closes it. The outcome is always
    /// [`QueryOutcome::Cancelled`], whatever the cancel call returns.
    ///
    /// The service moves the query into its exception state before acknowledging a
    /// cancel, so there is no need to poll again afterwards.
    pub(crate) fn cancel_query(&mut self, handle: &QueryHandle) -> QueryOutcome {
        info!("cancelling query {handle}");
        self.output.info("Cancelling query ...");

        match self.invoke("cancel", |c| c.cancel(handle)) {
            Ok(_) => debug!("cancel of {handle} acknowledged"),
            Err(RpcError::NotConnected) => return QueryOutcome::Cancelled,
            Err(e) => debug!("cancel of {handle} failed: {e}"),
        }

        self.close_handle(handle);
        QueryOutcome::Cancelled
    }
}
