//! Seams to the remote execution endpoint. Handlers never talk to a network
//! themselves: reads go through a [`ReadExecutor`], state-changing calls through
//! the two steps of a [`WriteExecutor`]. Both are supplied by the enclosing
//! application, bundled together with the caller's identity inside an
//! [`ExecutionContext`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{Abi, Address, CallerIdentity, TxHandle};

/// Error an executor rejects with. Handlers hand it back to their caller untouched.
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

/// Description of a single contract function at a resolved address. Every handler,
/// and every alternate way of consuming one, is derived from this.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractCall {
    pub address: Address,
    pub abi: Arc<Abi>,
    pub function_name: String,
}

impl ContractCall {
    pub fn new(address: Address, abi: Arc<Abi>, function_name: impl Into<String>) -> Self {
        Self {
            address,
            abi,
            function_name: function_name.into(),
        }
    }

    pub(crate) fn read_request(&self, args: Vec<Value>) -> ReadRequest {
        ReadRequest {
            address: self.address,
            abi: Arc::clone(&self.abi),
            function_name: self.function_name.clone(),
            args,
        }
    }

    pub(crate) fn simulate_request(
        &self,
        account: Option<Address>,
        args: Vec<Value>,
    ) -> SimulateRequest {
        SimulateRequest {
            address: self.address,
            abi: Arc::clone(&self.abi),
            function_name: self.function_name.clone(),
            account,
            args,
        }
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.function_name, self.address)
    }
}

/// Arguments of a read-only query.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadRequest {
    pub address: Address,
    pub abi: Arc<Abi>,
    pub function_name: String,
    pub args: Vec<Value>,
}

/// Arguments of the dry-run of a state-changing call. `account` is the caller's
/// address, or `None` when no account is connected.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulateRequest {
    pub address: Address,
    pub abi: Arc<Abi>,
    pub function_name: String,
    pub account: Option<Address>,
    pub args: Vec<Value>,
}

/// Submission payload prepared by a successful simulation. Its contents are
/// owned by the write executor and are passed back to it as-is on submission.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedPayload(Value);

impl PreparedPayload {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Result of simulating a state-changing call: the payload to submit and the
/// value the call would return.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    pub payload: PreparedPayload,
    pub result: Value,
}

impl Simulation {
    pub fn new(payload: PreparedPayload, result: Value) -> Self {
        Self { payload, result }
    }
}

/// Executes read-only queries against the remote endpoint, returning the decoded
/// result of the function.
#[async_trait]
pub trait ReadExecutor: Send + Sync {
    async fn read(&self, request: ReadRequest) -> Result<Value, ExecutorError>;
}

/// Executes state-changing calls in two steps: a dry-run that validates the call
/// against current remote state, followed by the submission of the payload that
/// dry-run prepared.
#[async_trait]
pub trait WriteExecutor: Send + Sync {
    async fn simulate(&self, request: SimulateRequest) -> Result<Simulation, ExecutorError>;

    /// Submit a prepared payload. Resolves to `None` when there is no active signer
    /// to submit with, which is not an error.
    async fn submit(&self, payload: PreparedPayload) -> Result<Option<TxHandle>, ExecutorError>;
}

/// Polling interval of [`ReadHandler::watch`](crate::operations::ReadHandler::watch)
/// subscriptions unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(4_000);

/// Everything compiled handlers need from the enclosing application. Treated as
/// read-only for as long as handlers compiled from it are alive; once any of the
/// three parts changes, compile a new set of handlers.
#[derive(Clone)]
pub struct ExecutionContext {
    reader: Arc<dyn ReadExecutor>,
    writer: Arc<dyn WriteExecutor>,
    caller: CallerIdentity,
    poll_interval: Duration,
}

impl ExecutionContext {
    pub fn new(
        reader: Arc<dyn ReadExecutor>,
        writer: Arc<dyn WriteExecutor>,
        caller: CallerIdentity,
    ) -> Self {
        Self {
            reader,
            writer,
            caller,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Interval at which read subscriptions re-query the remote endpoint.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn reader(&self) -> &Arc<dyn ReadExecutor> {
        &self.reader
    }

    pub fn writer(&self) -> &Arc<dyn WriteExecutor> {
        &self.writer
    }

    pub fn caller(&self) -> &CallerIdentity {
        &self.caller
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether `other` is made of the same executors, the same caller and the same
    /// polling interval. Executors are compared by identity, the rest by value.
    pub fn same_as(&self, other: &ExecutionContext) -> bool {
        Arc::ptr_eq(&self.reader, &other.reader)
            && Arc::ptr_eq(&self.writer, &other.writer)
            && self.caller == other.caller
            && self.poll_interval == other.poll_interval
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("caller", &self.caller)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
