//! Compilation of an [`AbiMap`] into per-contract handler factories.
//!
//! The compiler binds every contract interface to an [`ExecutionContext`]. Each
//! resulting [`ContractFactory`] produces a fresh [`HandlerSet`] every time it is
//! asked for one: handlers are cheap to derive and nothing is cached between
//! calls.
//!
//! ```
//! # use std::sync::Arc;
//! # use contract_handlers::prelude::*;
//! # async fn run(ctx: ExecutionContext, abi_map: AbiMap) -> contract_handlers::Result<()> {
//! let contracts = compile(&ctx, &abi_map);
//! let token = contracts.contract("DemoToken", Some("0x1111111111111111111111111111111111111111".parse()?))?;
//! let balance = token
//!     .read("balanceOf")
//!     .expect("balanceOf is a view function")
//!     .call(vec![serde_json::json!("0x2222222222222222222222222222222222222222")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ErrorKind;
use crate::executor::{ContractCall, ExecutionContext};
use crate::normalize::AbiMap;
use crate::operations::{Handler, HandlerSet};
use crate::result::Result;
use crate::types::{Abi, Address};

/// Compile every contract of `abi_map` against `ctx`.
pub fn compile(ctx: &ExecutionContext, abi_map: &AbiMap) -> ContractFactories {
    let factories = abi_map
        .iter()
        .map(|(name, entry)| {
            debug!(
                target: "contract_handlers",
                contract = %name,
                functions = entry.abi.functions().count(),
                default_address = ?entry.default_address,
                "compiling contract"
            );
            let factory = ContractFactory {
                name: name.to_string(),
                abi: Arc::clone(&entry.abi),
                default_address: entry.default_address,
                ctx: ctx.clone(),
            };
            (name.to_string(), factory)
        })
        .collect();

    ContractFactories { factories }
}

/// Derive the handlers of every function of `abi` at `address`. Functions are
/// classified by their mutability alone: `view` and `pure` ones become reads,
/// the rest become simulate-then-submit writes. Members other than functions
/// are skipped.
pub fn compile_handlers(ctx: &ExecutionContext, abi: &Arc<Abi>, address: Address) -> HandlerSet {
    let mut set = HandlerSet::new(address);
    for function in abi.functions() {
        let call = ContractCall::new(address, Arc::clone(abi), function.name.clone());
        set.push(Handler::new(call, function.clone(), ctx));
    }
    set
}

/// Handler factory of a single contract.
#[derive(Clone)]
pub struct ContractFactory {
    name: String,
    abi: Arc<Abi>,
    default_address: Option<Address>,
    ctx: ExecutionContext,
}

impl ContractFactory {
    /// Logical name of the contract.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &Arc<Abi> {
        &self.abi
    }

    pub fn default_address(&self) -> Option<Address> {
        self.default_address
    }

    /// Whether the factory can only produce handlers for an explicit address.
    pub fn requires_address(&self) -> bool {
        self.default_address.is_none()
    }

    /// Handlers for the contract deployed at `address`. Always overrides the
    /// default address.
    pub fn at(&self, address: Address) -> HandlerSet {
        compile_handlers(&self.ctx, &self.abi, address)
    }

    /// Handlers for `address` if given, or for the default address otherwise.
    /// Fails with [`ErrorKind::MissingAddress`] when neither is available.
    pub fn handlers(&self, address: Option<Address>) -> Result<HandlerSet> {
        let address = address.or(self.default_address).ok_or_else(|| {
            ErrorKind::MissingAddress.message(format!(
                "contract `{}` has no default address; an explicit address is required",
                self.name
            ))
        })?;
        Ok(self.at(address))
    }

    /// Handlers for the default address.
    pub fn deployed(&self) -> Result<HandlerSet> {
        self.handlers(None)
    }
}

impl fmt::Debug for ContractFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractFactory")
            .field("name", &self.name)
            .field("default_address", &self.default_address)
            .finish_non_exhaustive()
    }
}

/// Factories of every compiled contract, keyed by contract name.
#[derive(Clone, Debug, Default)]
pub struct ContractFactories {
    factories: BTreeMap<String, ContractFactory>,
}

impl ContractFactories {
    pub fn get(&self, name: &str) -> Option<&ContractFactory> {
        self.factories.get(name)
    }

    /// Shorthand for looking up the factory of `name` and asking it for handlers.
    pub fn contract(&self, name: &str, address: Option<Address>) -> Result<HandlerSet> {
        self.get(name)
            .ok_or_else(|| {
                ErrorKind::UnknownContract.message(format!("no contract named `{name}`"))
            })?
            .handlers(address)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContractFactory)> {
        self.factories.iter().map(|(name, factory)| (name.as_str(), factory))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
