//! Scripted in-memory transport for tests.
//!
//! Calls are answered strictly in the order they were scripted. A call of the wrong kind,
//! a request differing from the scripted one, or a call past the end of the script fails
//! with `TransportError::Other` describing the mismatch.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transport::{
    BeginTransactionRequest, BeginTransactionResponse, CommitTransactionRequest,
    ExecuteStatementRequest, ExecuteStatementResponse, RdsDataTransport,
    RollbackTransactionRequest, TransactionStatusResponse,
};

/// A request as the transport received it.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    ExecuteStatement(ExecuteStatementRequest),
    BeginTransaction(BeginTransactionRequest),
    CommitTransaction(CommitTransactionRequest),
    RollbackTransaction(RollbackTransactionRequest),
}

impl RecordedRequest {
    fn kind(&self) -> &'static str {
        match self {
            RecordedRequest::ExecuteStatement(_) => "execute_statement",
            RecordedRequest::BeginTransaction(_) => "begin_transaction",
            RecordedRequest::CommitTransaction(_) => "commit_transaction",
            RecordedRequest::RollbackTransaction(_) => "rollback_transaction",
        }
    }
}

#[derive(Debug)]
enum Reply {
    Execute(Result<ExecuteStatementResponse, TransportError>),
    Begin(Result<BeginTransactionResponse, TransportError>),
    Commit(Result<TransactionStatusResponse, TransportError>),
    Rollback(Result<TransactionStatusResponse, TransportError>),
}

impl Reply {
    fn kind(&self) -> &'static str {
        match self {
            Reply::Execute(_) => "execute_statement",
            Reply::Begin(_) => "begin_transaction",
            Reply::Commit(_) => "commit_transaction",
            Reply::Rollback(_) => "rollback_transaction",
        }
    }
}

#[derive(Debug)]
struct ScriptedCall {
    expected: Option<RecordedRequest>,
    reply: Reply,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<ScriptedCall>>,
    received: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, expected: Option<RecordedRequest>, reply: Reply) -> &Self {
        lock(&self.script).push_back(ScriptedCall { expected, reply });
        self
    }

    /// Answer the next `execute_statement` call with `reply`, whatever the request.
    pub fn on_execute(
        &self,
        reply: Result<ExecuteStatementResponse, TransportError>,
    ) -> &Self {
        self.push(None, Reply::Execute(reply))
    }

    /// Answer the next `execute_statement` call, which must carry exactly `expected`.
    pub fn expect_execute(
        &self,
        expected: ExecuteStatementRequest,
        reply: Result<ExecuteStatementResponse, TransportError>,
    ) -> &Self {
        self.push(
            Some(RecordedRequest::ExecuteStatement(expected)),
            Reply::Execute(reply),
        )
    }

    pub fn on_begin(&self, reply: Result<BeginTransactionResponse, TransportError>) -> &Self {
        self.push(None, Reply::Begin(reply))
    }

    pub fn expect_begin(
        &self,
        expected: BeginTransactionRequest,
        reply: Result<BeginTransactionResponse, TransportError>,
    ) -> &Self {
        self.push(
            Some(RecordedRequest::BeginTransaction(expected)),
            Reply::Begin(reply),
        )
    }

    pub fn on_commit(&self, reply: Result<TransactionStatusResponse, TransportError>) -> &Self {
        self.push(None, Reply::Commit(reply))
    }

    pub fn expect_commit(
        &self,
        expected: CommitTransactionRequest,
        reply: Result<TransactionStatusResponse, TransportError>,
    ) -> &Self {
        self.push(
            Some(RecordedRequest::CommitTransaction(expected)),
            Reply::Commit(reply),
        )
    }

    pub fn on_rollback(&self, reply: Result<TransactionStatusResponse, TransportError>) -> &Self {
        self.push(None, Reply::Rollback(reply))
    }

    pub fn expect_rollback(
        &self,
        expected: RollbackTransactionRequest,
        reply: Result<TransactionStatusResponse, TransportError>,
    ) -> &Self {
        self.push(
            Some(RecordedRequest::RollbackTransaction(expected)),
            Reply::Rollback(reply),
        )
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn received(&self) -> Vec<RecordedRequest> {
        lock(&self.received).clone()
    }

    #[must_use]
    pub fn executed_statements(&self) -> Vec<ExecuteStatementRequest> {
        lock(&self.received)
            .iter()
            .filter_map(|request| match request {
                RecordedRequest::ExecuteStatement(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Scripted calls that have not happened yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.script).len()
    }

    fn answer(&self, request: RecordedRequest) -> Result<Reply, TransportError> {
        lock(&self.received).push(request.clone());

        let Some(call) = lock(&self.script).pop_front() else {
            return Err(TransportError::Other(format!(
                "unscripted {} call: {request:?}",
                request.kind()
            )));
        };

        if call.reply.kind() != request.kind() {
            return Err(TransportError::Other(format!(
                "expected a {} call, got {}",
                call.reply.kind(),
                request.kind()
            )));
        }
        if let Some(expected) = call.expected
            && expected != request
        {
            return Err(TransportError::Other(format!(
                "request mismatch: expected {expected:?}, got {request:?}"
            )));
        }
        Ok(call.reply)
    }
}

#[async_trait]
impl RdsDataTransport for MockTransport {
    async fn execute_statement(
        &self,
        request: &ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, TransportError> {
        match self.answer(RecordedRequest::ExecuteStatement(request.clone()))? {
            Reply::Execute(reply) => reply,
            other => Err(TransportError::Other(format!("wrong reply {other:?}"))),
        }
    }

    async fn begin_transaction(
        &self,
        request: &BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, TransportError> {
        match self.answer(RecordedRequest::BeginTransaction(request.clone()))? {
            Reply::Begin(reply) => reply,
            other => Err(TransportError::Other(format!("wrong reply {other:?}"))),
        }
    }

    async fn commit_transaction(
        &self,
        request: &CommitTransactionRequest,
    ) -> Result<TransactionStatusResponse, TransportError> {
        match self.answer(RecordedRequest::CommitTransaction(request.clone()))? {
            Reply::Commit(reply) => reply,
            other => Err(TransportError::Other(format!("wrong reply {other:?}"))),
        }
    }

    async fn rollback_transaction(
        &self,
        request: &RollbackTransactionRequest,
    ) -> Result<TransactionStatusResponse, TransportError> {
        match self.answer(RecordedRequest::RollbackTransaction(request.clone()))? {
            Reply::Rollback(reply) => reply,
            other => Err(TransportError::Other(format!("wrong reply {other:?}"))),
        }
    }
}
