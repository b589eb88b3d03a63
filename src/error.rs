//! Error types shared across the session.
//!
//! A [`QueryService`](crate::rpc::QueryService) raises [`RpcFault`]s. The session gateway turns
//! those into [`RpcError`]s, which are what the rest of the session reasons about.
use thiserror::Error;

/// Failure raised by a single call against the remote service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcFault {
    #[error("stale query handle")]
    StaleHandle,

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Unknown(String),
}

/// Classification of a gateway call that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConnected,
    StaleHandle,
    RemoteError,
    TransportError,
    Unknown,
}

/// Outcome of a gateway call that did not succeed. The display text is what the
/// user sees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("Not connected (use CONNECT to establish a connection)")]
    NotConnected,

    #[error("Error: Stale query handle")]
    StaleHandle,

    #[error("ERROR: {0}")]
    Remote(String),

    #[error("RPC Error: {0}")]
    Status(String),

    #[error("Error communicating with server: {0}")]
    Transport(String),

    #[error("Unknown exception: {0}")]
    Unknown(String),
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::NotConnected => ErrorKind::NotConnected,
            RpcError::StaleHandle => ErrorKind::StaleHandle,
            RpcError::Remote(_) | RpcError::Status(_) => ErrorKind::RemoteError,
            RpcError::Transport(_) => ErrorKind::TransportError,
            RpcError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the connection must be considered dead after this error.
    pub fn disconnects(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TransportError | ErrorKind::Unknown
        )
    }
}

impl From<RpcFault> for RpcError {
    fn from(value: RpcFault) -> Self {
        match value {
            RpcFault::StaleHandle => RpcError::StaleHandle,
            RpcFault::Remote(message) => RpcError::Remote(message),
            RpcFault::Transport(message) => RpcError::Transport(message),
            RpcFault::Unknown(message) => RpcError::Unknown(message),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Error connecting: {0}")]
    Open(RpcFault),

    #[error(
        "Error: Unable to communicate with service at {address} ({reason}). This service may not be a query server. Check host:port and try again."
    )]
    Probe { address: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("connect string must be of form <hostname:port>, got '{0}'")]
    Malformed(String),

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("Unknown query option: {name}\nAvailable query options are: \n\t{available}")]
    Unknown { name: String, available: String },

    #[error("Error: SET <option>=<value>")]
    Malformed,
}
