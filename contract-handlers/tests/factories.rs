mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{addr, demo_abi_map, token_abi, MockChain, ALICE, TODOS, TOKEN};
use contract_handlers::prelude::*;
use contract_handlers::{provider, ContractsProvider, ErrorKind};
use serde_json::json;
use test_log::test;

const OTHER: &str = "0x2222222222222222222222222222222222222222";

#[test]
fn test_one_factory_per_contract() {
    let chain = MockChain::new();
    let contracts = compile(&chain.context(), &demo_abi_map());

    let names: Vec<_> = contracts.names().collect();
    assert_eq!(names, ["DemoToken", "Todos"]);
    assert_eq!(contracts.get("Todos").unwrap().default_address(), Some(addr(TODOS)));
    assert!(contracts.get("DemoToken").unwrap().requires_address());
}

#[test(tokio::test)]
async fn test_default_address_resolution() -> anyhow::Result<()> {
    let chain = MockChain::new();
    let contracts = compile(&chain.context(), &demo_abi_map());
    let factory = contracts.get("Todos").unwrap();

    let todos = factory.handlers(None)?;
    assert_eq!(todos.address(), addr(TODOS));
    todos.read("todos").unwrap().call(vec![json!(0)]).await?;

    let todos = factory.handlers(Some(addr(OTHER)))?;
    assert_eq!(todos.address(), addr(OTHER));
    todos.read("todos").unwrap().call(vec![json!(0)]).await?;

    let reads = chain.log.reads();
    assert_eq!(reads[0].address, addr(TODOS));
    assert_eq!(reads[1].address, addr(OTHER), "explicit address overrides the default");

    Ok(())
}

#[test]
fn test_missing_address() {
    let chain = MockChain::new();
    let contracts = compile(&chain.context(), &demo_abi_map());

    let err = contracts.contract("DemoToken", None).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MissingAddress);

    let token = contracts.get("DemoToken").unwrap().at(addr(TOKEN));
    assert_eq!(token.address(), addr(TOKEN));

    let err = contracts.contract("Staking", Some(addr(TOKEN))).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnknownContract);
}

#[test]
fn test_handler_classification() {
    let chain = MockChain::new();
    let contracts = compile(&chain.context(), &demo_abi_map());
    let token = contracts.contract("DemoToken", Some(addr(TOKEN))).unwrap();

    let names: Vec<_> = token.names().collect();
    assert_eq!(names, ["balanceOf", "buy", "mint", "safeTransferFrom", "testPure"]);
    assert!(!token.contains("Transfer"), "events get no handler");

    for handler in token.iter() {
        let function = handler.function();
        let expected = function.state_mutability.call_kind();
        assert_eq!(handler.kind(), expected, "{}", function.name);
        assert_eq!(handler.contract_call().function_name, function.name);
        assert_eq!(handler.contract_call().address, addr(TOKEN));
    }
    assert!(token.read("balanceOf").is_some());
    assert!(token.write("balanceOf").is_none());
    assert!(token.write("mint").is_some());
}

#[test(tokio::test)]
async fn test_overloads() -> anyhow::Result<()> {
    let chain = MockChain::new();
    let contracts = compile(&chain.context(), &demo_abi_map());
    let token = contracts.contract("DemoToken", Some(addr(TOKEN)))?;

    assert_eq!(token.overloads("safeTransferFrom").len(), 2);
    assert_eq!(token.get("safeTransferFrom").unwrap().function().arity(), 4);
    assert_eq!(
        token.get_overload("safeTransferFrom", 3).unwrap().function().signature(),
        "safeTransferFrom(address,address,uint256)"
    );
    assert_eq!(
        token
            .by_signature("safeTransferFrom(address,address,uint256,bytes)")
            .unwrap()
            .function()
            .arity(),
        4
    );

    token
        .call("safeTransferFrom", vec![json!(ALICE), json!(OTHER), json!(1)])
        .await?;
    assert_eq!(chain.log.simulations()[0].args.len(), 3);

    let err = token.call("burn", vec![]).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnknownFunction);

    Ok(())
}

#[test]
fn test_factory_calls_are_fresh() {
    let chain = MockChain::new();
    let contracts = compile(&chain.context(), &demo_abi_map());
    let factory = contracts.get("DemoToken").unwrap();

    let first = factory.at(addr(TOKEN));
    let second = factory.at(addr(TOKEN));
    assert_eq!(first.len(), second.len());
    let first_call = first.get("mint").unwrap().contract_call();
    let second_call = second.get("mint").unwrap().contract_call();
    assert_eq!(first_call, second_call);
    assert!(Arc::ptr_eq(&first_call.abi, &second_call.abi));
    assert!(Arc::ptr_eq(&first_call.abi, factory.abi()));
}

#[test]
fn test_compile_handlers_directly() {
    let chain = MockChain::new();
    let abi = Arc::new(token_abi());
    let set = contract_handlers::compiler::compile_handlers(&chain.context(), &abi, addr(TOKEN));
    assert_eq!(set.len(), 5);
    assert_eq!(set.iter().count(), 6);
}

#[test]
fn test_provider_recompiles_on_change() {
    let chain = MockChain::new();
    let mut contracts_provider = ContractsProvider::new(demo_abi_map());
    assert_eq!(contracts_provider.factories().unwrap_err().kind(), &ErrorKind::Configuration);

    let ctx = chain.context();
    let first = contracts_provider.update(ctx.clone());
    let again = contracts_provider.update(ctx.clone());
    assert!(Arc::ptr_eq(&first, &again), "same context reuses compiled factories");

    let switched = contracts_provider.update(ExecutionContext::new(
        Arc::clone(ctx.reader()),
        Arc::clone(ctx.writer()),
        CallerIdentity::new(addr(OTHER)),
    ));
    assert!(!Arc::ptr_eq(&first, &switched), "caller change recompiles");

    let slower = contracts_provider.update(
        ExecutionContext::new(
            Arc::clone(ctx.reader()),
            Arc::clone(ctx.writer()),
            CallerIdentity::new(addr(OTHER)),
        )
        .with_poll_interval(Duration::from_millis(10)),
    );
    assert!(!Arc::ptr_eq(&switched, &slower), "interval change recompiles");
    let read = slower
        .contract("Todos", None)
        .unwrap()
        .read("todos")
        .unwrap()
        .clone();
    assert_eq!(read.poll_interval(), Duration::from_millis(10));

    let reconnected = contracts_provider.update(chain.context());
    assert!(!Arc::ptr_eq(&slower, &reconnected), "new executors recompile");
    assert!(Arc::ptr_eq(&contracts_provider.factories().unwrap(), &reconnected));
}

#[test(tokio::test)]
async fn test_scoped_contracts() -> anyhow::Result<()> {
    let err = provider::contracts().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Configuration);

    let chain = MockChain::new().read_returns(json!("scoped"));
    let mut contracts_provider = ContractsProvider::new(demo_abi_map());
    let value = contracts_provider
        .provide(chain.context(), async {
            let contracts = provider::contracts()?;
            let todos = contracts.contract("Todos", None)?;
            let value = todos.read("todos").unwrap().call(vec![json!(0)]).await?;
            Ok::<_, contract_handlers::Error>(value)
        })
        .await?;
    assert_eq!(value, json!("scoped"));

    assert!(provider::contracts().is_err(), "nothing leaks out of the scope");

    Ok(())
}
