use std::{
    io::{Read, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    time::Duration,
};

use log::{debug, trace, warn};

use crate::{
    error::RpcFault,
    rpc::{
        Connection, Connector, Explanation, InsertResult, Query, QueryHandle, QueryService,
        RemoteState, ResultBatch, ServerAddress, Status,
    },
};

use super::{ProtocolTransport, Request, Response};

/// Streams that can be torn down by a [`RemoteConnection`].
pub trait Shutdownable {
    fn shutdown_stream(&mut self);
}

impl Shutdownable for TcpStream {
    fn shutdown_stream(&mut self) {
        if let Err(e) = self.shutdown(Shutdown::Both) {
            debug!("tcp shutdown failed: {e}");
        }
    }
}

/// [`QueryService`] speaking the bincode protocol over a byte stream.
pub struct RemoteConnection<T: Read + Write + Shutdownable> {
    transport: ProtocolTransport<T>,
    closed: bool,
}

impl<T: Read + Write + Shutdownable> RemoteConnection<T> {
    pub fn new(stream: T) -> Self {
        Self {
            transport: ProtocolTransport::new(stream),
            closed: false,
        }
    }

    fn call(&mut self, req: Request) -> Result<Response, RpcFault> {
        if self.closed {
            return Err(RpcFault::Transport("connection is closed".to_string()));
        }

        trace!("sending {} request: {req:?}", req.name());
        self.transport.write_request(&req)?;
        let resp = self.transport.read_response()?;
        trace!("received response: {resp:?}");

        match resp {
            Response::Fault { code, description } => Err((code, description).into()),
            resp => Ok(resp),
        }
    }
}

fn unexpected(req: &'static str, resp: Response) -> RpcFault {
    RpcFault::Unknown(format!("unexpected reply to {req}: {resp:?}"))
}

impl<T: Read + Write + Shutdownable> QueryService for RemoteConnection<T> {
    fn submit_query(&mut self, query: &Query) -> Result<QueryHandle, RpcFault> {
        match self.call(Request::Submit(query.clone()))? {
            Response::Handle(handle) => Ok(handle),
            resp => Err(unexpected("submit", resp)),
        }
    }

    fn get_state(&mut self, handle: &QueryHandle) -> Result<RemoteState, RpcFault> {
        match self.call(Request::GetState(handle.clone()))? {
            Response::State(state) => Ok(state),
            resp => Err(unexpected("get_state", resp)),
        }
    }

    fn fetch(&mut self, handle: &QueryHandle, max_rows: usize) -> Result<ResultBatch, RpcFault> {
        let req = Request::Fetch {
            handle: handle.clone(),
            max_rows: max_rows as u64,
        };
        match self.call(req)? {
            Response::Batch(batch) => Ok(batch),
            resp => Err(unexpected("fetch", resp)),
        }
    }

    fn finalize_insert(&mut self, handle: &QueryHandle) -> Result<InsertResult, RpcFault> {
        match self.call(Request::FinalizeInsert(handle.clone()))? {
            Response::Inserted(result) => Ok(result),
            resp => Err(unexpected("finalize_insert", resp)),
        }
    }

    fn cancel(&mut self, handle: &QueryHandle) -> Result<Status, RpcFault> {
        match self.call(Request::Cancel(handle.clone()))? {
            Response::Status(status) => Ok(status),
            resp => Err(unexpected("cancel", resp)),
        }
    }

    fn close(&mut self, handle: &QueryHandle) -> Result<Status, RpcFault> {
        match self.call(Request::Close(handle.clone()))? {
            Response::Status(status) => Ok(status),
            resp => Err(unexpected("close", resp)),
        }
    }

    fn get_log(&mut self, log_context: &str) -> Result<String, RpcFault> {
        match self.call(Request::GetLog(log_context.to_string()))? {
            Response::Log(log) => Ok(log),
            resp => Err(unexpected("get_log", resp)),
        }
    }

    fn ping(&mut self) -> Result<Status, RpcFault> {
        match self.call(Request::Ping)? {
            Response::Status(status) => Ok(status),
            resp => Err(unexpected("ping", resp)),
        }
    }

    fn explain(&mut self, query: &Query) -> Result<Explanation, RpcFault> {
        match self.call(Request::Explain(query.clone()))? {
            Response::Explanation(explanation) => Ok(explanation),
            resp => Err(unexpected("explain", resp)),
        }
    }

    fn reset_catalog(&mut self) -> Result<Status, RpcFault> {
        match self.call(Request::ResetCatalog)? {
            Response::Status(status) => Ok(status),
            resp => Err(unexpected("reset_catalog", resp)),
        }
    }
}

impl<T: Read + Write + Shutdownable> Connection for RemoteConnection<T> {
    fn shutdown(&mut self) {
        if !self.closed {
            self.closed = true;
            self.transport.get_mut().shutdown_stream();
        }
    }
}

/// Opens plain TCP connections to the query service.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for TcpConnector {
    type Connection = RemoteConnection<TcpStream>;

    fn open(&mut self, address: &ServerAddress) -> Result<Self::Connection, RpcFault> {
        let addrs = (address.host.as_str(), address.port)
            .to_socket_addrs()
            .map_err(|e| RpcFault::Transport(format!("could not resolve {address}: {e}")))?;

        let mut last_err = None;
        for addr in addrs {
            debug!("connecting to {addr}");
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream
                        .set_nodelay(true)
                        .map_err(|e| RpcFault::Transport(e.to_string()))?;
                    return Ok(RemoteConnection::new(stream));
                }
                Err(e) => {
                    warn!("failed to connect to {addr}: {e}");
                    last_err = Some(e);
                }
            }
        }

        Err(RpcFault::Transport(match last_err {
            Some(e) => e.to_string(),
            None => format!("no addresses found for {address}"),
        }))
    }
}
