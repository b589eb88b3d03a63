//! Abstract RPC capability of the remote query service.
//!
//! The session never talks to a socket directly. Everything it needs from the remote
//! service is expressed by the [`QueryService`] trait, and a fresh service is obtained
//! through a [`Connector`]. The concrete bincode/TCP implementation lives in
//! [`protocol`](crate::protocol); tests plug in scripted services instead.
//!
//! # Key Components
//!
//! - [`QueryService`]: The calls a session can make against the remote service.
//! - [`Connection`]: A [`QueryService`] bound to an open transport that can be shut down.
//! - [`Connector`]: Opens new [`Connection`]s for a [`ServerAddress`].
//! - [`Reply`]: Lets the gateway find a status code embedded in a successful reply.
use std::{collections::BTreeMap, fmt, str::FromStr};

use bincode::{Decode, Encode};

use crate::error::{AddressError, RpcFault};

/// Port used when a connect string omits one.
pub const DEFAULT_PORT: u16 = 21000;

/// Query text plus the session options applied to it.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    /// `NAME=value` pairs, passed through verbatim.
    pub configuration: Vec<String>,
}

/// Server-assigned identifier for a submitted query.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq, Hash)]
pub struct QueryHandle {
    pub id: String,
    pub log_context: String,
}

impl fmt::Display for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq, Eq)]
pub enum RemoteState {
    Created,
    Initialized,
    Compiled,
    Running,
    Finished,
    Exception,
}

#[derive(Debug, Clone, Default, Encode, Decode, PartialEq, Eq)]
pub struct ResultBatch {
    pub rows: Vec<String>,
    pub has_more: bool,
}

/// Rows appended per partition by a finished insert.
#[derive(Debug, Clone, Default, Encode, Decode, PartialEq, Eq)]
pub struct InsertResult {
    pub rows_appended: BTreeMap<String, i64>,
}

impl InsertResult {
    pub fn total_rows(&self) -> u64 {
        self.rows_appended
            .values()
            .map(|rows| (*rows).max(0) as u64)
            .sum()
    }
}

#[derive(Debug, Clone, Default, Encode, Decode, PartialEq, Eq)]
pub struct Explanation {
    pub textual: String,
}

#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Cancelled,
    AnalysisError,
    NotImplemented,
    RuntimeError,
    InternalError,
}

/// Application-level status carried by acknowledgement replies.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub error_msgs: Vec<String>,
}

impl Status {
    pub fn ok() -> Self {
        Self {
            code: StatusCode::Ok,
            error_msgs: Vec::new(),
        }
    }

    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            error_msgs: vec![message.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    /// Joined error messages, falling back to the status code.
    pub fn message(&self) -> String {
        if self.error_msgs.is_empty() {
            format!("{:?}", self.code)
        } else {
            self.error_msgs.join("\n")
        }
    }
}

/// A successful reply that may still carry a failing status code.
pub trait Reply {
    fn status(&self) -> Option<&Status> {
        None
    }
}

impl Reply for Status {
    fn status(&self) -> Option<&Status> {
        Some(self)
    }
}

impl Reply for QueryHandle {}
impl Reply for RemoteState {}
impl Reply for ResultBatch {}
impl Reply for InsertResult {}
impl Reply for Explanation {}
impl Reply for String {}

/// Calls the session can issue against the remote query service.
///
/// Every call either completes or raises an [`RpcFault`]; the session classifies
/// faults itself, so implementations should not try to recover.
pub trait QueryService {
    fn submit_query(&mut self, query: &Query) -> Result<QueryHandle, RpcFault>;
    fn get_state(&mut self, handle: &QueryHandle) -> Result<RemoteState, RpcFault>;
    fn fetch(&mut self, handle: &QueryHandle, max_rows: usize) -> Result<ResultBatch, RpcFault>;
    fn finalize_insert(&mut self, handle: &QueryHandle) -> Result<InsertResult, RpcFault>;
    fn cancel(&mut self, handle: &QueryHandle) -> Result<Status, RpcFault>;
    fn close(&mut self, handle: &QueryHandle) -> Result<Status, RpcFault>;
    fn get_log(&mut self, log_context: &str) -> Result<String, RpcFault>;
    fn ping(&mut self) -> Result<Status, RpcFault>;
    fn explain(&mut self, query: &Query) -> Result<Explanation, RpcFault>;
    fn reset_catalog(&mut self) -> Result<Status, RpcFault>;
}

/// A [`QueryService`] bound to an open transport.
pub trait Connection: QueryService {
    /// Closes the underlying transport. Must be safe to call more than once.
    fn shutdown(&mut self);
}

/// Opens transports to the remote service.
pub trait Connector {
    type Connection: Connection;

    fn open(&mut self, address: &ServerAddress) -> Result<Self::Connection, RpcFault>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl ServerAddress {
    /// Parses `host[:port]`, using `default_port` when the port is missing.
    pub fn parse_with_default(s: &str, default_port: u16) -> Result<Self, AddressError> {
        let s = s.trim();
        let parts = s.split(':').collect::<Vec<&str>>();

        match parts.as_slice() {
            [host] if !host.is_empty() => Ok(Self::new(*host, default_port)),
            [host, port] if !host.is_empty() => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| AddressError::InvalidPort(port.to_string()))?;
                Ok(Self::new(*host, port))
            }
            _ => Err(AddressError::Malformed(s.to_string())),
        }
    }
}

impl FromStr for ServerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(s, DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_with_port() {
        let addr: ServerAddress = "localhost:21050".parse().unwrap();
        assert_eq!(addr, ServerAddress::new("localhost", 21050));
        assert_eq!(addr.to_string(), "localhost:21050");
    }

    #[test]
    fn address_without_port_uses_default() {
        let addr: ServerAddress = "db-01".parse().unwrap();
        assert_eq!(addr.port, DEFAULT_PORT);
    }

    #[test]
    #[should_panic(expected = "InvalidPort")]
    fn address_invalid_port() {
        let _: ServerAddress = "db-01:http".parse().unwrap();
    }

    #[test]
    #[should_panic(expected = "Malformed")]
    fn address_too_many_parts() {
        let _: ServerAddress = "a:1:2".parse().unwrap();
    }

    #[test]
    fn insert_result_sums_partitions() {
        let result = InsertResult {
            rows_appended: BTreeMap::from([("p0".to_string(), 3), ("p1".to_string(), 2)]),
        };
        assert_eq!(result.total_rows(), 5);
    }

    #[test]
    fn status_message_falls_back_to_code() {
        let status = Status {
            code: StatusCode::RuntimeError,
            error_msgs: vec![],
        };
        assert_eq!(status.message(), "RuntimeError");

        let status = Status {
            code: StatusCode::AnalysisError,
            error_msgs: vec!["bad table".into(), "bad column".into()],
        };
        assert_eq!(status.message(), "bad table\nbad column");
    }
}
