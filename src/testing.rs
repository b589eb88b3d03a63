//! Scripted query service for unit tests.
use std::{
    cell::{Cell, RefCell, RefMut},
    collections::VecDeque,
    rc::Rc,
};

use crate::{
    config::SessionConfig,
    error::RpcFault,
    output::RecordingOutput,
    rpc::{
        Connection, Connector, Explanation, InsertResult, Query, QueryHandle, QueryService,
        RemoteState, ResultBatch, ServerAddress, Status,
    },
    session::{Interrupt, Session},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Submit(String),
    GetState,
    Fetch(usize),
    FinalizeInsert,
    Cancel,
    Close,
    GetLog(String),
    Ping,
    Explain(String),
    ResetCatalog,
}

/// Replies handed out in order; an empty queue answers with a benign default.
#[derive(Debug, Default)]
pub(crate) struct Script {
    pub submit: VecDeque<Result<QueryHandle, RpcFault>>,
    pub states: VecDeque<Result<RemoteState, RpcFault>>,
    pub batches: VecDeque<Result<ResultBatch, RpcFault>>,
    pub inserts: VecDeque<Result<InsertResult, RpcFault>>,
    pub cancels: VecDeque<Result<Status, RpcFault>>,
    pub closes: VecDeque<Result<Status, RpcFault>>,
    pub logs: VecDeque<Result<String, RpcFault>>,
    pub pings: VecDeque<Result<Status, RpcFault>>,
    pub explains: VecDeque<Result<Explanation, RpcFault>>,
    pub resets: VecDeque<Result<Status, RpcFault>>,
    pub open_failure: Option<RpcFault>,
}

type Hook = Box<dyn FnMut(&Call)>;

/// Shared view of the fake service: its script, and everything done to it.
#[derive(Clone, Default)]
pub(crate) struct Remote {
    script: Rc<RefCell<Script>>,
    calls: Rc<RefCell<Vec<Call>>>,
    queries: Rc<RefCell<Vec<Query>>>,
    closed: Rc<RefCell<Vec<String>>>,
    hook: Rc<RefCell<Option<Hook>>>,
    opens: Rc<Cell<usize>>,
    shutdowns: Rc<Cell<usize>>,
}

impl Remote {
    pub fn script(&self) -> RefMut<'_, Script> {
        self.script.borrow_mut()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn last_query(&self) -> Option<Query> {
        self.queries.borrow().last().cloned()
    }

    pub fn closed_handles(&self) -> Vec<String> {
        self.closed.borrow().clone()
    }

    pub fn opens(&self) -> usize {
        self.opens.get()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.get()
    }

    /// Runs `hook` after every recorded call, e.g. to raise an interrupt mid-query.
    pub fn on_call(&self, hook: impl FnMut(&Call) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call.clone());
        if let Some(hook) = self.hook.borrow_mut().as_mut() {
            hook(&call);
        }
    }
}

pub(crate) struct MockConnector {
    remote: Remote,
}

impl Connector for MockConnector {
    type Connection = MockService;

    fn open(&mut self, _address: &ServerAddress) -> Result<Self::Connection, RpcFault> {
        if let Some(fault) = self.remote.script().open_failure.take() {
            return Err(fault);
        }
        self.remote.opens.set(self.remote.opens.get() + 1);
        Ok(MockService {
            remote: self.remote.clone(),
        })
    }
}

pub(crate) struct MockService {
    remote: Remote,
}

fn handle(id: &str) -> QueryHandle {
    QueryHandle {
        id: id.to_string(),
        log_context: id.to_string(),
    }
}

impl QueryService for MockService {
    fn submit_query(&mut self, query: &Query) -> Result<QueryHandle, RpcFault> {
        self.remote.queries.borrow_mut().push(query.clone());
        let reply = self.remote.script().submit.pop_front();
        self.remote.record(Call::Submit(query.text.clone()));
        reply.unwrap_or_else(|| Ok(handle("q1")))
    }

    fn get_state(&mut self, _handle: &QueryHandle) -> Result<RemoteState, RpcFault> {
        let reply = self.remote.script().states.pop_front();
        self.remote.record(Call::GetState);
        reply.unwrap_or(Ok(RemoteState::Finished))
    }

    fn fetch(&mut self, _handle: &QueryHandle, max_rows: usize) -> Result<ResultBatch, RpcFault> {
        let reply = self.remote.script().batches.pop_front();
        self.remote.record(Call::Fetch(max_rows));
        reply.unwrap_or_else(|| Ok(ResultBatch::default()))
    }

    fn finalize_insert(&mut self, _handle: &QueryHandle) -> Result<InsertResult, RpcFault> {
        let reply = self.remote.script().inserts.pop_front();
        self.remote.record(Call::FinalizeInsert);
        reply.unwrap_or_else(|| Ok(InsertResult::default()))
    }

    fn cancel(&mut self, _handle: &QueryHandle) -> Result<Status, RpcFault> {
        let reply = self.remote.script().cancels.pop_front();
        self.remote.record(Call::Cancel);
        reply.unwrap_or_else(|| Ok(Status::ok()))
    }

    fn close(&mut self, handle: &QueryHandle) -> Result<Status, RpcFault> {
        self.remote.closed.borrow_mut().push(handle.id.clone());
        let reply = self.remote.script().closes.pop_front();
        self.remote.record(Call::Close);
        reply.unwrap_or_else(|| Ok(Status::ok()))
    }

    fn get_log(&mut self, log_context: &str) -> Result<String, RpcFault> {
        let reply = self.remote.script().logs.pop_front();
        self.remote.record(Call::GetLog(log_context.to_string()));
        reply.unwrap_or_else(|| Ok(String::new()))
    }

    fn ping(&mut self) -> Result<Status, RpcFault> {
        let reply = self.remote.script().pings.pop_front();
        self.remote.record(Call::Ping);
        reply.unwrap_or_else(|| Ok(Status::ok()))
    }

    fn explain(&mut self, query: &Query) -> Result<Explanation, RpcFault> {
        let reply = self.remote.script().explains.pop_front();
        self.remote.record(Call::Explain(query.text.clone()));
        reply.unwrap_or_else(|| Ok(Explanation::default()))
    }

    fn reset_catalog(&mut self) -> Result<Status, RpcFault> {
        let reply = self.remote.script().resets.pop_front();
        self.remote.record(Call::ResetCatalog);
        reply.unwrap_or_else(|| Ok(Status::ok()))
    }
}

impl Connection for MockService {
    fn shutdown(&mut self) {
        self.remote.shutdowns.set(self.remote.shutdowns.get() + 1);
    }
}

pub(crate) type MockSession = Session<MockConnector, RecordingOutput>;

pub(crate) fn disconnected_session(remote: &Remote) -> MockSession {
    let connector = MockConnector {
        remote: remote.clone(),
    };
    Session::new(
        connector,
        RecordingOutput::default(),
        SessionConfig::default(),
        Interrupt::new(),
    )
}

/// A session connected to `remote`, with the connect probe and messages already cleared.
pub(crate) fn connected_session(remote: &Remote) -> MockSession {
    let mut session = disconnected_session(remote);
    assert!(session.connect(&ServerAddress::new("localhost", 21000)));
    remote.clear_calls();
    *session.output_mut() = RecordingOutput::default();
    session
}
