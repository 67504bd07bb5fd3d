#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use contract_handlers::prelude::*;
use contract_handlers::ExecutorError;
use serde_json::{json, Value};

pub const TODOS: &str = "0x0000000000000000000000000000000000000000";
pub const TOKEN: &str = "0x1111111111111111111111111111111111111111";
pub const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Rejection produced by the mock executors.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RemoteError(pub String);

/// Every executor call, in the order it was made.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Read(ReadRequest),
    Simulate(SimulateRequest),
    Submit(PreparedPayload),
}

#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<Event>>>);

impl Log {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<ReadRequest> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Read(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn simulations(&self) -> Vec<SimulateRequest> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Simulate(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn submissions(&self) -> Vec<PreparedPayload> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Submit(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }
}

pub struct MockReader {
    log: Log,
    result: Result<Value, String>,
}

#[async_trait]
impl ReadExecutor for MockReader {
    async fn read(&self, request: ReadRequest) -> Result<Value, ExecutorError> {
        self.log.push(Event::Read(request));
        self.result
            .clone()
            .map_err(|msg| Box::new(RemoteError(msg)) as ExecutorError)
    }
}

pub struct MockWriter {
    log: Log,
    simulated: Result<Value, String>,
    submitted: Result<Option<TxHandle>, String>,
}

#[async_trait]
impl WriteExecutor for MockWriter {
    async fn simulate(&self, request: SimulateRequest) -> Result<Simulation, ExecutorError> {
        let payload = PreparedPayload::new(json!({
            "function": request.function_name,
            "args": request.args,
        }));
        self.log.push(Event::Simulate(request));

        match &self.simulated {
            Ok(result) => Ok(Simulation::new(payload, result.clone())),
            Err(msg) => Err(Box::new(RemoteError(msg.clone()))),
        }
    }

    async fn submit(&self, payload: PreparedPayload) -> Result<Option<TxHandle>, ExecutorError> {
        self.log.push(Event::Submit(payload));
        self.submitted
            .clone()
            .map_err(|msg| Box::new(RemoteError(msg)) as ExecutorError)
    }
}

/// Builder for an execution context backed by recording mock executors.
pub struct MockChain {
    pub log: Log,
    read: Result<Value, String>,
    simulated: Result<Value, String>,
    submitted: Result<Option<TxHandle>, String>,
    caller: CallerIdentity,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            log: Log::default(),
            read: Ok(Value::Null),
            simulated: Ok(Value::Null),
            submitted: Ok(Some(TxHandle::new("0xfeed"))),
            caller: CallerIdentity::new(ALICE.parse().unwrap()),
        }
    }

    pub fn read_returns(mut self, value: Value) -> Self {
        self.read = Ok(value);
        self
    }

    pub fn read_fails(mut self, msg: &str) -> Self {
        self.read = Err(msg.to_string());
        self
    }

    pub fn simulation_returns(mut self, value: Value) -> Self {
        self.simulated = Ok(value);
        self
    }

    pub fn simulation_fails(mut self, msg: &str) -> Self {
        self.simulated = Err(msg.to_string());
        self
    }

    pub fn submission_returns(mut self, handle: Option<&str>) -> Self {
        self.submitted = Ok(handle.map(TxHandle::from));
        self
    }

    pub fn submission_fails(mut self, msg: &str) -> Self {
        self.submitted = Err(msg.to_string());
        self
    }

    pub fn caller(mut self, caller: CallerIdentity) -> Self {
        self.caller = caller;
        self
    }

    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(
            Arc::new(MockReader {
                log: self.log.clone(),
                result: self.read.clone(),
            }),
            Arc::new(MockWriter {
                log: self.log.clone(),
                simulated: self.simulated.clone(),
                submitted: self.submitted.clone(),
            }),
            self.caller.clone(),
        )
    }
}

pub fn token_abi() -> Abi {
    Abi::from_value(json!([
        {
            "type": "function",
            "name": "balanceOf",
            "inputs": [{ "name": "owner", "type": "address" }],
            "outputs": [{ "name": "", "type": "uint256" }],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "testPure",
            "inputs": [],
            "outputs": [{ "name": "", "type": "string" }],
            "stateMutability": "pure"
        },
        {
            "type": "function",
            "name": "mint",
            "inputs": [{ "name": "to", "type": "address" }],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "buy",
            "inputs": [],
            "outputs": [{ "name": "", "type": "uint256" }],
            "stateMutability": "payable"
        },
        {
            "type": "function",
            "name": "safeTransferFrom",
            "inputs": [
                { "name": "from", "type": "address" },
                { "name": "to", "type": "address" },
                { "name": "id", "type": "uint256" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "safeTransferFrom",
            "inputs": [
                { "name": "from", "type": "address" },
                { "name": "to", "type": "address" },
                { "name": "id", "type": "uint256" },
                { "name": "data", "type": "bytes" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "Transfer",
            "anonymous": false,
            "inputs": [
                { "name": "from", "type": "address", "indexed": true },
                { "name": "to", "type": "address", "indexed": true },
                { "name": "value", "type": "uint256", "indexed": false }
            ]
        }
    ]))
    .unwrap()
}

pub fn todos_abi() -> Abi {
    Abi::from_value(json!([
        {
            "type": "function",
            "name": "create",
            "inputs": [{ "name": "todo", "type": "string" }],
            "outputs": [{ "name": "", "type": "uint256" }],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "todos",
            "inputs": [{ "name": "id", "type": "uint256" }],
            "outputs": [{ "name": "", "type": "string" }],
            "stateMutability": "view"
        }
    ]))
    .unwrap()
}

/// Interfaces of the demo application: `Todos` deployed at a known address,
/// `DemoToken` without one.
pub fn demo_abi_map() -> AbiMap {
    let exports = Exports::new()
        .factory("Todos__factory", todos_abi())
        .factory("DemoToken__factory", token_abi())
        .other("version", json!("1.0.0"));
    let mut defaults = contract_handlers::DefaultAddresses::new();
    defaults.insert("Todos".into(), TODOS.parse().unwrap());
    normalize(&exports, Some(&defaults))
}

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}
