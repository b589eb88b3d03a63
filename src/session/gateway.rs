//! Single-call gateway to the remote service.
//!
//! Every RPC the session makes goes through [`Session::invoke`], which enforces the
//! connected precondition, classifies faults into [`RpcError`]s, surfaces the message to
//! the user, and drops the connection when a fault leaves it unusable.
use log::{debug, trace, warn};

use crate::{
    error::{RpcError, RpcFault},
    output::Output,
    rpc::{Connector, Reply, Status},
};

use super::Session;

impl<C: Connector, O: Output> Session<C, O> {
    /// Runs `rpc` against the open connection.
    ///
    /// Returns [`RpcError::NotConnected`] without calling `rpc` when the session is
    /// disconnected. A successful reply carrying a non-OK [`Status`] is an
    /// [`RpcError::Status`] and leaves the connection up.
    pub(crate) fn invoke<T, F>(&mut self, name: &str, rpc: F) -> Result<T, RpcError>
    where
        T: Reply,
        F: FnOnce(&mut C::Connection) -> Result<T, RpcFault>,
    {
        if !self.state.is_connected() {
            debug!("{name} skipped, session is not connected");
            return Err(self.surface(RpcError::NotConnected));
        }
        let Some(connection) = self.connections.connection_mut() else {
            return Err(self.surface(RpcError::NotConnected));
        };

        trace!("invoking {name}");
        match rpc(connection) {
            Ok(reply) => {
                if let Some(message) = reply.status().filter(|s| !s.is_ok()).map(Status::message) {
                    return Err(self.surface(RpcError::Status(message)));
                }
                Ok(reply)
            }
            Err(fault) => {
                debug!("{name} failed: {fault:?}");
                Err(self.surface(fault.into()))
            }
        }
    }

    fn surface(&mut self, err: RpcError) -> RpcError {
        self.output.error(&err.to_string());
        if err.disconnects() {
            warn!("dropping connection: {err}");
            self.connections.disconnect(&mut self.state);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ErrorKind,
        rpc::{QueryHandle, QueryService, RemoteState, StatusCode},
        session::DISCONNECTED_PROMPT,
        testing::{Call, Remote, connected_session, disconnected_session},
    };

    use super::*;

    fn handle() -> QueryHandle {
        QueryHandle {
            id: "q1".into(),
            log_context: "q1".into(),
        }
    }

    #[test]
    fn not_connected_makes_no_call() {
        let remote = Remote::default();
        let mut session = disconnected_session(&remote);

        let err = session
            .invoke("get_state", |c| c.get_state(&handle()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConnected);
        assert!(remote.calls().is_empty());
        assert_eq!(
            session.output.errors,
            vec!["Not connected (use CONNECT to establish a connection)"]
        );
    }

    #[test]
    fn success_passes_reply_through() {
        let remote = Remote::default();
        remote
            .script()
            .states
            .push_back(Ok(RemoteState::Running));
        let mut session = connected_session(&remote);

        let state = session.invoke("get_state", |c| c.get_state(&handle()));
        assert_eq!(state, Ok(RemoteState::Running));
        assert_eq!(remote.calls(), vec![Call::GetState]);
        assert!(session.output.errors.is_empty());
    }

    #[test]
    fn remote_error_keeps_connection() {
        let remote = Remote::default();
        remote
            .script()
            .states
            .push_back(Err(RpcFault::Remote("table t not found".into())));
        let mut session = connected_session(&remote);

        let err = session
            .invoke("get_state", |c| c.get_state(&handle()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteError);
        assert!(session.state.is_connected());
        assert_eq!(session.output.errors, vec!["ERROR: table t not found"]);
    }

    #[test]
    fn stale_handle_keeps_connection() {
        let remote = Remote::default();
        remote.script().closes.push_back(Err(RpcFault::StaleHandle));
        let mut session = connected_session(&remote);

        let err = session.invoke("close", |c| c.close(&handle())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StaleHandle);
        assert!(session.state.is_connected());
    }

    #[test]
    fn failing_status_is_remote_error() {
        let remote = Remote::default();
        remote.script().resets.push_back(Ok(Status {
            code: StatusCode::RuntimeError,
            error_msgs: vec!["catalog locked".into(), "retry later".into()],
        }));
        let mut session = connected_session(&remote);

        let err = session
            .invoke("reset_catalog", |c| c.reset_catalog())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteError);
        assert!(session.state.is_connected());
        assert_eq!(
            session.output.errors,
            vec!["RPC Error: catalog locked\nretry later"]
        );
    }

    #[test]
    fn transport_failure_disconnects() {
        let remote = Remote::default();
        remote
            .script()
            .states
            .push_back(Err(RpcFault::Transport("broken pipe".into())));
        let mut session = connected_session(&remote);

        let err = session
            .invoke("get_state", |c| c.get_state(&handle()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
        assert!(!session.state.is_connected());
        assert_eq!(session.prompt(), DISCONNECTED_PROMPT);
        assert_eq!(remote.shutdowns(), 1);

        // Nothing reaches the service afterwards.
        remote.clear_calls();
        let err = session
            .invoke("get_state", |c| c.get_state(&handle()))
            .unwrap_err();
        assert_eq!(err, RpcError::NotConnected);
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn unknown_failure_disconnects() {
        let remote = Remote::default();
        remote
            .script()
            .logs
            .push_back(Err(RpcFault::Unknown("garbled frame".into())));
        let mut session = connected_session(&remote);

        let err = session.invoke("get_log", |c| c.get_log("q1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(!session.state.is_connected());
    }
}
