//! Opening, probing and tearing down the session's single connection.
use log::{debug, info, warn};

use crate::{
    error::ConnectError,
    output::Output,
    rpc::{Connection, Connector, QueryService, ServerAddress},
};

use super::{Session, SessionState};

/// Owns the one open [`Connection`] a session may have.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    connection: Option<C::Connection>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connection: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut C::Connection> {
        self.connection.as_mut()
    }

    /// Replaces the current connection with a new, probed one.
    ///
    /// The previous connection is always closed first. On failure nothing is left open
    /// and `state` stays disconnected.
    pub fn connect(
        &mut self,
        address: &ServerAddress,
        state: &mut SessionState,
    ) -> Result<(), ConnectError> {
        self.disconnect(state);

        let mut connection = self.connector.open(address).map_err(ConnectError::Open)?;
        debug!("transport to {address} open, probing");

        let probe = match connection.ping() {
            Ok(status) if status.is_ok() => Ok(()),
            Ok(status) => Err(status.message()),
            Err(fault) => Err(fault.to_string()),
        };
        if let Err(reason) = probe {
            warn!("liveness probe to {address} failed: {reason}");
            connection.shutdown();
            return Err(ConnectError::Probe {
                address: address.to_string(),
                reason,
            });
        }

        info!("connected to {address}");
        self.connection = Some(connection);
        state.mark_connected(address.clone());
        Ok(())
    }

    /// Closes the current connection, if any. Safe to call repeatedly.
    pub fn disconnect(&mut self, state: &mut SessionState) {
        if let Some(mut connection) = self.connection.take() {
            debug!("closing transport");
            connection.shutdown();
        }
        state.mark_disconnected();
    }
}

impl<C: Connector, O: Output> Session<C, O> {
    /// Connects to `address`, reporting any failure to the output.
    pub fn connect(&mut self, address: &ServerAddress) -> bool {
        match self.connections.connect(address, &mut self.state) {
            Ok(()) => {
                self.verbose(&format!("Connected to {address}"));
                true
            }
            Err(e) => {
                self.output.error(&e.to_string());
                false
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.connections.disconnect(&mut self.state);
    }
}
