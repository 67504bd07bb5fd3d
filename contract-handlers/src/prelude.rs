//! Commonly used items, for a single glob import.

pub use crate::compiler::{compile, ContractFactories, ContractFactory};
pub use crate::executor::{
    ExecutionContext, PreparedPayload, ReadExecutor, ReadRequest, SimulateRequest, Simulation,
    WriteExecutor,
};
pub use crate::normalize::{normalize, AbiMap, Exports};
pub use crate::operations::{Handler, HandlerSet};
pub use crate::result::{CallOutcome, WriteOutcome};
pub use crate::types::{Abi, Address, CallKind, CallerIdentity, TxHandle};
