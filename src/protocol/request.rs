use bincode::{Decode, Encode};

use crate::rpc::{Query, QueryHandle};

/// Messages sent from the shell to the query service.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub enum Request {
    Submit(Query),
    GetState(QueryHandle),
    Fetch { handle: QueryHandle, max_rows: u64 },
    FinalizeInsert(QueryHandle),
    Cancel(QueryHandle),
    Close(QueryHandle),
    GetLog(String),
    Explain(Query),
    ResetCatalog,
    Ping,
}

impl Request {
    /// Short name used in logs and unexpected-reply errors.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Submit(_) => "submit",
            Request::GetState(_) => "get_state",
            Request::Fetch { .. } => "fetch",
            Request::FinalizeInsert(_) => "finalize_insert",
            Request::Cancel(_) => "cancel",
            Request::Close(_) => "close",
            Request::GetLog(_) => "get_log",
            Request::Explain(_) => "explain",
            Request::ResetCatalog => "reset_catalog",
            Request::Ping => "ping",
        }
    }
}
