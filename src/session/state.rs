use log::debug;

use crate::rpc::{QueryHandle, ServerAddress};

use super::Interrupt;

pub const DISCONNECTED_PROMPT: &str = "[Not connected] > ";

/// Connectivity, the in-flight handle and the interrupt flag of one session.
///
/// Only the connection manager and the gateway change `connected`; only the query
/// lifecycle changes the active handle.
#[derive(Debug, Default)]
pub struct SessionState {
    connected: bool,
    server: Option<ServerAddress>,
    active_handle: Option<QueryHandle>,
    interrupt: Interrupt,
}

impl SessionState {
    pub fn new(interrupt: Interrupt) -> Self {
        Self {
            interrupt,
            ..Default::default()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Address of the last successful connection, kept after a disconnect.
    pub fn server(&self) -> Option<&ServerAddress> {
        self.server.as_ref()
    }

    pub fn active_handle(&self) -> Option<&QueryHandle> {
        self.active_handle.as_ref()
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn prompt(&self) -> String {
        match (&self.server, self.connected) {
            (Some(server), true) => format!("[{server}] > "),
            _ => DISCONNECTED_PROMPT.to_string(),
        }
    }

    pub(crate) fn mark_connected(&mut self, server: ServerAddress) {
        debug!("session connected to {server}");
        self.server = Some(server);
        self.connected = true;
    }

    pub(crate) fn mark_disconnected(&mut self) {
        if self.connected {
            debug!("session disconnected");
        }
        self.connected = false;
    }

    pub(crate) fn set_active(&mut self, handle: QueryHandle) {
        self.active_handle = Some(handle);
    }

    pub(crate) fn clear_active(&mut self) -> Option<QueryHandle> {
        self.active_handle.take()
    }
}
