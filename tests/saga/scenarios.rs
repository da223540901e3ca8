use super::test_helpers::{SagaContext, saga_context};
use rstest_bdd_macros::scenario;

#[scenario(path = "tests/features/saga.feature", name = "Provision a named topology")]
fn scenario_named_topology(saga_context: SagaContext) {
    let _ = saga_context;
}

#[scenario(
    path = "tests/features/saga.feature",
    name = "Provision with controller default names"
)]
fn scenario_default_names(saga_context: SagaContext) {
    let _ = saga_context;
}

#[scenario(
    path = "tests/features/saga.feature",
    name = "Roll back the router when route advertisement fails"
)]
fn scenario_route_advertisement_failure(saga_context: SagaContext) {
    let _ = saga_context;
}

#[scenario(
    path = "tests/features/saga.feature",
    name = "Roll back the router when attaching it to T0 fails"
)]
fn scenario_t0_attachment_failure(saga_context: SagaContext) {
    let _ = saga_context;
}

#[scenario(
    path = "tests/features/saga.feature",
    name = "Roll back the router when switch creation fails"
)]
fn scenario_switch_creation_failure(saga_context: SagaContext) {
    let _ = saga_context;
}

#[scenario(
    path = "tests/features/saga.feature",
    name = "Roll back switch and router when attaching the switch fails"
)]
fn scenario_switch_attachment_failure(saga_context: SagaContext) {
    let _ = saga_context;
}

#[scenario(
    path = "tests/features/saga.feature",
    name = "Keep the root cause when a rollback delete fails"
)]
fn scenario_compensation_failure(saga_context: SagaContext) {
    let _ = saga_context;
}
