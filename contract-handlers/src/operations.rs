//! All handler types that are generated/used when making write transactions or
//! read-only calls into a contract.
//!
//! Handlers are produced by the [compiler](crate::compiler) and each of them is
//! bound to a single [`ContractCall`]: the function name, the contract's
//! interface and a resolved address. Nothing is carried over between
//! invocations, so concurrent calls on the same handler are independent.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::error::ErrorKind;
use crate::executor::{
    ContractCall, ExecutionContext, PreparedPayload, ReadExecutor, Simulation, WriteExecutor,
};
use crate::result::{CallOutcome, Result, WriteOutcome};
use crate::types::{Address, CallKind, Function};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handler of a `view` or `pure` function: a single query through the read
/// executor, returning its decoded result.
#[derive(Clone)]
pub struct ReadHandler {
    call: ContractCall,
    function: Function,
    reader: Arc<dyn ReadExecutor>,
    poll_interval: Duration,
}

impl ReadHandler {
    pub(crate) fn new(call: ContractCall, function: Function, ctx: &ExecutionContext) -> Self {
        Self {
            call,
            function,
            reader: Arc::clone(ctx.reader()),
            poll_interval: ctx.poll_interval(),
        }
    }

    pub fn contract_call(&self) -> &ContractCall {
        &self.call
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Interval used by [`ReadHandler::watch`].
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Query the function with positional `args`. Rejections of the read executor
    /// come back as [`ErrorKind::Query`] carrying the original error.
    pub async fn call(&self, args: Vec<Value>) -> Result<Value> {
        trace!(target: "contract_handlers", call = %self.call, args = args.len(), "read");
        self.reader
            .read(self.call.read_request(args))
            .await
            .map_err(|err| ErrorKind::Query.custom(err))
    }

    /// Same as [`ReadHandler::call`], deserializing the decoded result into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, args: Vec<Value>) -> Result<T> {
        let value = self.call(args).await?;
        serde_json::from_value(value).map_err(|e| ErrorKind::DataConversion.custom(e))
    }

    /// Subscribe to the function's result: the query is repeated once right away and
    /// then on every tick of the execution context's polling interval. Each query
    /// yields one item, successful or not; the stream itself never ends.
    pub fn watch(&self, args: Vec<Value>) -> BoxStream<'static, Result<Value>> {
        self.watch_every(args, self.poll_interval)
    }

    /// [`ReadHandler::watch`] with an explicit polling interval.
    pub fn watch_every(&self, args: Vec<Value>, every: Duration) -> BoxStream<'static, Result<Value>> {
        let every = every.max(MIN_POLL_INTERVAL);
        let handler = self.clone();

        stream::unfold(
            (handler, args, None::<Interval>),
            move |(handler, args, ticker)| async move {
                // Interval needs a running timer, so it is created on first poll.
                let mut ticker = ticker.unwrap_or_else(|| {
                    let mut ticker = tokio::time::interval(every);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    ticker
                });
                ticker.tick().await;

                let item = handler.call(args.clone()).await;
                Some((item, (handler, args, Some(ticker))))
            },
        )
        .boxed()
    }
}

/// Handler of a `nonpayable` or `payable` function: the call is simulated first,
/// and the payload the simulation prepared is then submitted.
#[derive(Clone)]
pub struct WriteHandler {
    call: ContractCall,
    function: Function,
    writer: Arc<dyn WriteExecutor>,
    account: Option<Address>,
}

impl WriteHandler {
    pub(crate) fn new(call: ContractCall, function: Function, ctx: &ExecutionContext) -> Self {
        Self {
            call,
            function,
            writer: Arc::clone(ctx.writer()),
            account: ctx.caller().address,
        }
    }

    pub fn contract_call(&self) -> &ContractCall {
        &self.call
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Simulate and then submit the function with positional `args`.
    ///
    /// A rejected simulation fails with [`ErrorKind::Simulation`] and nothing gets
    /// submitted. A rejected submission fails with [`ErrorKind::Submission`]. When
    /// the executor has no signer to submit with, this still succeeds, with a
    /// [`WriteOutcome`] whose handle is `None`.
    pub async fn call(&self, args: Vec<Value>) -> Result<WriteOutcome> {
        self.prepare(args).await?.submit().await
    }

    /// Run only the simulation, returning the prepared call so that it can be
    /// inspected and submitted later.
    pub async fn prepare(&self, args: Vec<Value>) -> Result<PreparedWrite> {
        trace!(target: "contract_handlers", call = %self.call, args = args.len(), "simulate");
        let Simulation { payload, result } = self
            .writer
            .simulate(self.call.simulate_request(self.account, args))
            .await
            .map_err(|err| ErrorKind::Simulation.custom(err))?;

        Ok(PreparedWrite {
            call: self.call.clone(),
            writer: Arc::clone(&self.writer),
            payload,
            result,
        })
    }
}

/// A state-changing call that was simulated successfully and is ready to be
/// submitted.
#[derive(Clone)]
pub struct PreparedWrite {
    call: ContractCall,
    writer: Arc<dyn WriteExecutor>,
    payload: PreparedPayload,
    result: Value,
}

impl PreparedWrite {
    pub fn contract_call(&self) -> &ContractCall {
        &self.call
    }

    pub fn payload(&self) -> &PreparedPayload {
        &self.payload
    }

    /// The value the call returned while being simulated.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Submit the prepared payload, consuming it.
    pub async fn submit(self) -> Result<WriteOutcome> {
        trace!(target: "contract_handlers", call = %self.call, "submit");
        let handle = self
            .writer
            .submit(self.payload)
            .await
            .map_err(|err| ErrorKind::Submission.custom(err))?;

        if handle.is_none() {
            debug!(
                target: "contract_handlers",
                call = %self.call,
                "no active signer: call was simulated but not submitted"
            );
        }

        Ok(WriteOutcome::new(handle, self.result))
    }
}

/// Handler of a single contract function.
#[derive(Clone)]
pub enum Handler {
    Read(ReadHandler),
    Write(WriteHandler),
}

impl Handler {
    pub(crate) fn new(call: ContractCall, function: Function, ctx: &ExecutionContext) -> Self {
        match function.call_kind() {
            CallKind::Read => Self::Read(ReadHandler::new(call, function, ctx)),
            CallKind::Write => Self::Write(WriteHandler::new(call, function, ctx)),
        }
    }

    pub fn kind(&self) -> CallKind {
        match self {
            Self::Read(_) => CallKind::Read,
            Self::Write(_) => CallKind::Write,
        }
    }

    pub fn function(&self) -> &Function {
        match self {
            Self::Read(handler) => handler.function(),
            Self::Write(handler) => handler.function(),
        }
    }

    pub fn contract_call(&self) -> &ContractCall {
        match self {
            Self::Read(handler) => handler.contract_call(),
            Self::Write(handler) => handler.contract_call(),
        }
    }

    pub fn as_read(&self) -> Option<&ReadHandler> {
        match self {
            Self::Read(handler) => Some(handler),
            Self::Write(_) => None,
        }
    }

    pub fn as_write(&self) -> Option<&WriteHandler> {
        match self {
            Self::Read(_) => None,
            Self::Write(handler) => Some(handler),
        }
    }

    /// Invoke the handler with the strategy its function was classified with.
    pub async fn call(&self, args: Vec<Value>) -> Result<CallOutcome> {
        match self {
            Self::Read(handler) => handler.call(args).await.map(CallOutcome::Read),
            Self::Write(handler) => handler.call(args).await.map(CallOutcome::Write),
        }
    }
}

/// Handlers of every function of a contract deployed at one address, keyed by
/// function name. Overloads sharing a name are all kept, in declaration order.
#[derive(Clone)]
pub struct HandlerSet {
    address: Address,
    handlers: BTreeMap<String, Vec<Handler>>,
}

impl HandlerSet {
    pub(crate) fn new(address: Address) -> Self {
        Self {
            address,
            handlers: BTreeMap::new(),
        }
    }

    pub(crate) fn push(&mut self, handler: Handler) {
        self.handlers
            .entry(handler.function().name.clone())
            .or_default()
            .push(handler);
    }

    /// Address every handler of this set is bound to.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Handler for `name`. When the name is overloaded, the last declared
    /// overload is returned.
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.overloads(name).last()
    }

    /// All overloads of `name`, in declaration order.
    pub fn overloads(&self, name: &str) -> &[Handler] {
        self.handlers.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Overload of `name` taking `arity` arguments. The last declared one wins
    /// when several share the same arity.
    pub fn get_overload(&self, name: &str, arity: usize) -> Option<&Handler> {
        self.overloads(name)
            .iter()
            .rev()
            .find(|handler| handler.function().arity() == arity)
    }

    /// Handler by canonical signature, e.g. `transfer(address,uint256)`.
    pub fn by_signature(&self, signature: &str) -> Option<&Handler> {
        let name = signature.split('(').next().unwrap_or_default();
        self.overloads(name)
            .iter()
            .find(|handler| handler.function().signature() == signature)
    }

    pub fn read(&self, name: &str) -> Option<&ReadHandler> {
        self.get(name).and_then(Handler::as_read)
    }

    pub fn write(&self, name: &str) -> Option<&WriteHandler> {
        self.get(name).and_then(Handler::as_write)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Names of all functions with a handler.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Every handler of the set, overloads included.
    pub fn iter(&self) -> impl Iterator<Item = &Handler> {
        self.handlers.values().flatten()
    }

    /// Number of distinct function names.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke `name` with positional `args`, choosing the overload whose arity
    /// matches the number of arguments and falling back to [`HandlerSet::get`].
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<CallOutcome> {
        let handler = self
            .get_overload(name, args.len())
            .or_else(|| self.get(name))
            .ok_or_else(|| {
                ErrorKind::UnknownFunction.message(format!(
                    "contract at {} has no function `{name}`",
                    self.address
                ))
            })?;
        handler.call(args).await
    }
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("address", &self.address)
            .field("functions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
