//! Compile contract interface definitions into callable handlers.
//!
//! Interfaces come in as generated `<Name>__factory` exports and are first
//! [normalized](normalize::normalize) into an [`AbiMap`]. The map is then
//! [compiled](compiler::compile) against an [`ExecutionContext`], yielding one
//! [`ContractFactory`] per contract. A factory produces a [`HandlerSet`] for a
//! deployment address, with one handler per function: `view`/`pure` functions
//! query the read executor directly, every other function is simulated and then
//! submitted through the write executor.

pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod operations;
pub mod prelude;
pub mod provider;
pub mod result;
pub mod types;

pub use compiler::{compile, ContractFactories, ContractFactory};
pub use config::ContractsConfig;
pub use error::{Error, ErrorKind};
pub use executor::{
    ContractCall, ExecutionContext, ExecutorError, PreparedPayload, ReadExecutor, ReadRequest,
    SimulateRequest, Simulation, WriteExecutor,
};
pub use normalize::{normalize, AbiMap, ContractEntry, DefaultAddresses, Export, Exports};
pub use operations::{Handler, HandlerSet, PreparedWrite, ReadHandler, WriteHandler};
pub use provider::ContractsProvider;
pub use result::{CallOutcome, Result, WriteOutcome};
pub use types::{Abi, Address, CallKind, CallerIdentity, Function, StateMutability, TxHandle};
