//! Record of resources created by one saga run.

use std::fmt;

use tracing::{error, info};

use super::error::{CompensationFailure, StepFailure};
use super::step::ProvisioningStep;
use crate::controller::{LogicalSwitch, Router, SdnController};

/// A controller resource created by the saga.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CreatedResource {
    /// T1 router, by id.
    T1Router(String),
    /// Logical switch, by id.
    LogicalSwitch(String),
}

impl fmt::Display for CreatedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T1Router(id) => write!(f, "T1 router '{id}'"),
            Self::LogicalSwitch(id) => write!(f, "logical switch '{id}'"),
        }
    }
}

/// Resources created so far, owned by a single provisioning call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProvisioningLedger {
    router: Option<Router>,
    switch: Option<LogicalSwitch>,
}

impl ProvisioningLedger {
    /// Empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            router: None,
            switch: None,
        }
    }

    /// Records the created router.
    pub fn record_router(&mut self, router: Router) {
        self.router = Some(router);
    }

    /// Records the created switch.
    pub fn record_switch(&mut self, switch: LogicalSwitch) {
        self.switch = Some(switch);
    }

    /// Router created by the saga, if any.
    #[must_use]
    pub const fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    /// Switch created by the saga, if any.
    #[must_use]
    pub const fn switch(&self) -> Option<&LogicalSwitch> {
        self.switch.as_ref()
    }

    /// Created resources in creation order.
    #[must_use]
    pub fn created_resources(&self) -> Vec<CreatedResource> {
        let router = self
            .router
            .iter()
            .map(|router| CreatedResource::T1Router(router.id.clone()));
        let switch = self
            .switch
            .iter()
            .map(|switch| CreatedResource::LogicalSwitch(switch.id.clone()));
        router.chain(switch).collect()
    }

    pub(super) fn require_router<E>(&self, step: ProvisioningStep) -> Result<&str, StepFailure<E>>
    where
        E: std::error::Error + 'static,
    {
        self.router
            .as_ref()
            .map(|router| router.id.as_str())
            .ok_or(StepFailure::MissingResource {
                resource: "T1 router",
                step,
            })
    }

    pub(super) fn require_switch<E>(&self, step: ProvisioningStep) -> Result<&str, StepFailure<E>>
    where
        E: std::error::Error + 'static,
    {
        self.switch
            .as_ref()
            .map(|switch| switch.id.as_str())
            .ok_or(StepFailure::MissingResource {
                resource: "logical switch",
                step,
            })
    }

    /// Deletes every recorded resource in reverse creation order.
    ///
    /// Each delete is attempted regardless of earlier failures; the failures
    /// are logged and returned.
    pub async fn compensate<C>(&self, controller: &C) -> Vec<CompensationFailure<C::Error>>
    where
        C: SdnController,
    {
        let mut failures = Vec::new();
        for resource in self.created_resources().into_iter().rev() {
            let outcome = match &resource {
                CreatedResource::LogicalSwitch(id) => controller.delete_logical_switch(id).await,
                CreatedResource::T1Router(id) => controller.delete_t1_router(id).await,
            };
            match outcome {
                Ok(()) => info!(%resource, "deleted during rollback"),
                Err(err) => {
                    error!(%resource, error = %err, "failed to delete during rollback");
                    failures.push(CompensationFailure {
                        resource,
                        source: err,
                    });
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router {
            id: "t1-router-id".to_owned(),
            display_name: "router-name".to_owned(),
        }
    }

    fn switch() -> LogicalSwitch {
        LogicalSwitch {
            id: "switch-id".to_owned(),
            display_name: "switch-name".to_owned(),
        }
    }

    #[test]
    fn empty_ledger_has_nothing_to_undo() {
        assert!(ProvisioningLedger::new().created_resources().is_empty());
    }

    #[test]
    fn resources_are_listed_in_creation_order() {
        let mut ledger = ProvisioningLedger::new();
        ledger.record_router(router());
        ledger.record_switch(switch());

        assert_eq!(
            ledger.created_resources(),
            vec![
                CreatedResource::T1Router("t1-router-id".to_owned()),
                CreatedResource::LogicalSwitch("switch-id".to_owned()),
            ]
        );
    }

    #[test]
    fn missing_router_is_reported_for_dependent_step() {
        let ledger = ProvisioningLedger::new();
        let failure = ledger
            .require_router::<std::io::Error>(ProvisioningStep::AttachT1ToT0)
            .expect_err("no router recorded");
        assert_eq!(
            failure.to_string(),
            "T1 router missing before attach T1 router to T0 router"
        );
    }

    #[test]
    fn resource_display_names_kind_and_id() {
        assert_eq!(
            CreatedResource::T1Router("r".to_owned()).to_string(),
            "T1 router 'r'"
        );
        assert_eq!(
            CreatedResource::LogicalSwitch("s".to_owned()).to_string(),
            "logical switch 's'"
        );
    }
}
