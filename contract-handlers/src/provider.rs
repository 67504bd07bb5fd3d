//! Ambient access to compiled contracts.
//!
//! The compiler itself only ever takes its [`ExecutionContext`] as an argument.
//! This module layers two conveniences on top of it for applications whose
//! context changes over time (a wallet connecting, the endpoint switching):
//! a [`ContractsProvider`] that recompiles only when the context actually
//! changed, and a task-scoped slot from which code deep inside a task can grab
//! the current [`ContractFactories`] without having them passed down.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::compiler::{compile, ContractFactories};
use crate::error::ErrorKind;
use crate::executor::ExecutionContext;
use crate::normalize::AbiMap;
use crate::result::Result;

pub const MISSING_PROVIDER_ERROR: &str =
    "there are no contracts in scope: need to be ran from within `provider::scope`";

tokio::task_local! {
    static CONTRACTS: Arc<ContractFactories>;
}

/// Holds the interfaces of an application and the factories compiled from them
/// for the latest execution context.
#[derive(Debug)]
pub struct ContractsProvider {
    abi_map: AbiMap,
    current: Option<(ExecutionContext, Arc<ContractFactories>)>,
}

impl ContractsProvider {
    pub fn new(abi_map: AbiMap) -> Self {
        Self {
            abi_map,
            current: None,
        }
    }

    pub fn abi_map(&self) -> &AbiMap {
        &self.abi_map
    }

    /// Factories for `ctx`. They are recompiled only when `ctx` is not
    /// [the same](ExecutionContext::same_as) as the previous context; otherwise the
    /// previously compiled factories are handed out again.
    pub fn update(&mut self, ctx: ExecutionContext) -> Arc<ContractFactories> {
        if let Some((current_ctx, factories)) = &self.current {
            if current_ctx.same_as(&ctx) {
                return Arc::clone(factories);
            }
        }

        debug!(target: "contract_handlers", caller = ?ctx.caller().address, "recompiling contracts");
        let factories = Arc::new(compile(&ctx, &self.abi_map));
        self.current = Some((ctx, Arc::clone(&factories)));
        factories
    }

    /// Factories compiled by the last [`ContractsProvider::update`], if any.
    pub fn factories(&self) -> Result<Arc<ContractFactories>> {
        self.current
            .as_ref()
            .map(|(_, factories)| Arc::clone(factories))
            .ok_or_else(|| {
                ErrorKind::Configuration.message("contracts provider has no execution context yet")
            })
    }

    /// Update the provider with `ctx`, then run `task` with the resulting factories
    /// in scope.
    pub async fn provide<F>(&mut self, ctx: ExecutionContext, task: F) -> F::Output
    where
        F: Future,
    {
        let factories = self.update(ctx);
        scope(factories, task).await
    }
}

/// Run `task` with `factories` available through [`contracts`].
pub async fn scope<F>(factories: Arc<ContractFactories>, task: F) -> F::Output
where
    F: Future,
{
    CONTRACTS.scope(factories, task).await
}

/// The factories in scope of the current task. Fails right away with
/// [`ErrorKind::Configuration`] when called outside of [`scope`].
pub fn contracts() -> Result<Arc<ContractFactories>> {
    CONTRACTS
        .try_with(Arc::clone)
        .map_err(|_| ErrorKind::Configuration.message(MISSING_PROVIDER_ERROR))
}
