//! Shared state for provisioning scenarios.

use std::cell::RefCell;

use cpi_infra::test_support::{ControllerOperation, ScriptedController, ScriptedControllerError};
use cpi_infra::{NetworkTopology, ProvisioningError, SubnetDefinition};
use rstest::fixture;
use serde_json::{Value, json};

use crate::test_constants::{
    EDGE_CLUSTER_ID, GATEWAY, RANGE, T0_ROUTER_ID, TRANSPORT_ZONE_ID,
};

pub type SagaOutcome = Result<NetworkTopology, ProvisioningError<ScriptedControllerError>>;

/// Scenario state. Steps borrow the context, so fields use interior
/// mutability.
#[derive(Debug, Default)]
pub struct SagaContext {
    pub controller: RefCell<ScriptedController>,
    pub definition: RefCell<Option<SubnetDefinition>>,
    pub outcome: RefCell<Option<SagaOutcome>>,
}

impl SagaContext {
    pub fn configure(&self, configure: impl FnOnce(ScriptedController) -> ScriptedController) {
        let controller = self.controller.take();
        self.controller.replace(configure(controller));
    }
}

#[fixture]
pub fn saga_context() -> SagaContext {
    SagaContext::default()
}

pub fn definition(names: &[(&str, &str)]) -> SubnetDefinition {
    let mut properties = json!({
        "edge_cluster_id": EDGE_CLUSTER_ID,
        "t0_router_id": T0_ROUTER_ID,
        "transport_zone_id": TRANSPORT_ZONE_ID,
    });
    if let Some(map) = properties.as_object_mut() {
        for (key, value) in names {
            map.insert((*key).to_owned(), Value::from(*value));
        }
    }
    SubnetDefinition::new(RANGE, GATEWAY, properties)
}

pub fn parse_operation(name: &str) -> ControllerOperation {
    match name.trim() {
        "create_t1_router" => ControllerOperation::CreateT1Router,
        "enable_route_advertisement" => ControllerOperation::EnableRouteAdvertisement,
        "attach_t1_to_t0" => ControllerOperation::AttachT1ToT0,
        "create_logical_switch" => ControllerOperation::CreateLogicalSwitch,
        "attach_switch_to_t1" => ControllerOperation::AttachSwitchToT1,
        "delete_logical_switch" => ControllerOperation::DeleteLogicalSwitch,
        "delete_t1_router" => ControllerOperation::DeleteT1Router,
        other => panic!("unknown controller operation: {other}"),
    }
}
