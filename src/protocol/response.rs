use bincode::{Decode, Encode};

use crate::{
    error::RpcFault,
    rpc::{Explanation, InsertResult, QueryHandle, RemoteState, ResultBatch, Status},
};

/// Messages sent from the query service back to the shell.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub enum Response {
    Handle(QueryHandle),
    State(RemoteState),
    Batch(ResultBatch),
    Inserted(InsertResult),
    Status(Status),
    Log(String),
    Explanation(Explanation),
    Fault { code: FaultCode, description: String },
}

#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq, Eq)]
pub enum FaultCode {
    StaleHandle,
    Remote,
    Unknown,
}

impl Response {
    pub fn fault(code: FaultCode, description: impl Into<String>) -> Self {
        Response::Fault {
            code,
            description: description.into(),
        }
    }
}

impl From<(FaultCode, String)> for RpcFault {
    fn from((code, description): (FaultCode, String)) -> Self {
        match code {
            FaultCode::StaleHandle => RpcFault::StaleHandle,
            FaultCode::Remote => RpcFault::Remote(description),
            FaultCode::Unknown => RpcFault::Unknown(description),
        }
    }
}
