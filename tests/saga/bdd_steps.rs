//! BDD step definitions for provisioning and compensation.

use cpi_infra::{NetworkProvisioner, Subnet};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{SagaContext, definition, parse_operation};

#[given("a subnet definition with router name \"{router}\" and switch name \"{switch}\"")]
fn named_definition(saga_context: &SagaContext, router: String, switch: String) {
    saga_context.definition.replace(Some(definition(&[
        ("t1_name", router.as_str()),
        ("switch_name", switch.as_str()),
    ])));
}

#[given("a subnet definition without names")]
fn unnamed_definition(saga_context: &SagaContext) {
    saga_context.definition.replace(Some(definition(&[])));
}

#[given("the controller fails \"{operation}\" with \"{message}\"")]
fn controller_fails(saga_context: &SagaContext, operation: String, message: String) {
    let operation = parse_operation(&operation);
    saga_context.configure(|controller| controller.fail_on(operation, message));
}

#[when("I create the network infrastructure")]
fn create_infrastructure(saga_context: &SagaContext) {
    let definition = saga_context
        .definition
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("scenario must define a subnet first"));
    let subnet = Subnet::from_definition(&definition)
        .unwrap_or_else(|err| panic!("scenario subnet should validate: {err}"));
    let provisioner = NetworkProvisioner::new(saga_context.controller.borrow().clone());

    let runtime = tokio::runtime::Runtime::new()
        .unwrap_or_else(|err| panic!("failed to build tokio runtime: {err}"));
    let outcome = runtime.block_on(provisioner.create_infrastructure(&subnet));
    saga_context.outcome.replace(Some(outcome));
}

#[then("the network \"{id}\" named \"{name}\" is returned")]
fn network_returned(saga_context: &SagaContext, id: String, name: String) {
    let outcome = saga_context.outcome.borrow();
    let Some(Ok(topology)) = outcome.as_ref() else {
        panic!("expected a provisioned topology, got {outcome:?}");
    };
    assert_eq!(topology.id, id);
    assert_eq!(topology.display_name, name);
}

#[then("the controller received \"{operations}\"")]
fn controller_received(saga_context: &SagaContext, operations: String) {
    let expected: Vec<_> = operations.split(',').map(parse_operation).collect();
    assert_eq!(saga_context.controller.borrow().operations(), expected);
}

#[then("provisioning fails with \"{message}\"")]
fn provisioning_fails(saga_context: &SagaContext, message: String) {
    let outcome = saga_context.outcome.borrow();
    let Some(Err(error)) = outcome.as_ref() else {
        panic!("expected provisioning to fail, got {outcome:?}");
    };
    assert_eq!(error.to_string(), message);
}

#[then("\"{count}\" compensation failures are reported")]
fn compensation_failures_reported(saga_context: &SagaContext, count: usize) {
    let outcome = saga_context.outcome.borrow();
    let Some(Err(error)) = outcome.as_ref() else {
        panic!("expected provisioning to fail, got {outcome:?}");
    };
    assert_eq!(error.compensation_failures.len(), count);
    assert_eq!(error.fully_compensated(), count == 0);
}
