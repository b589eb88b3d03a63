//! Client-server communication protocol.
//!
//! This module defines the wire protocol spoken between the shell and the remote query
//! service, and the [`RemoteConnection`] that implements [`QueryService`](crate::rpc::QueryService)
//! on top of it.
//!
//! # Binary Format
//!
//! Every call is a single [`Request`] answered by a single [`Response`], both encoded with
//! bincode using big-endian fixed-width integers. Remote failures travel as
//! [`Response::Fault`]; anything that breaks the stream itself (IO errors, undecodable
//! frames) surfaces as a transport fault and ends the connection.
//!
//! # Key Components
//!
//! - [`ProtocolTransport`]: Frames requests and responses over any `Read + Write` stream.
//! - [`RemoteConnection`]: Request/response client for the query service.
//! - [`TcpConnector`]: Opens [`RemoteConnection`]s over TCP.
//!
//! # See Also
//!
//! - [`session`](crate::session): Drives queries through a connection.
mod client;
mod request;
mod response;
mod transport;

pub use client::{RemoteConnection, Shutdownable, TcpConnector};
pub use request::Request;
pub use response::{FaultCode, Response};
pub use transport::{ProtocolTransport, TransportError};
