//! Network topology provisioning saga.
//!
//! [`NetworkProvisioner`] walks [`ProvisioningStep::ORDER`] against an
//! [`SdnController`], recording every created resource in a
//! [`ProvisioningLedger`]. The first failing step triggers rollback of the
//! ledger in reverse creation order, after which the root cause is returned
//! as a [`ProvisioningError`].

mod error;
mod ledger;
mod step;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::controller::{IpSubnet, SdnController};
use crate::subnet::Subnet;

pub use error::{CompensationFailure, ProvisioningError, StepFailure};
pub use ledger::{CreatedResource, ProvisioningLedger};
pub use step::ProvisioningStep;

/// Network created for a subnet: the logical switch VMs attach to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkTopology {
    /// Logical switch id.
    pub id: String,
    /// Logical switch display name.
    pub display_name: String,
}

/// Creates routed logical switches for validated subnets.
#[derive(Debug)]
pub struct NetworkProvisioner<C> {
    controller: C,
}

impl<C> NetworkProvisioner<C>
where
    C: SdnController,
{
    /// Wraps an SDN controller.
    #[must_use]
    pub const fn new(controller: C) -> Self {
        Self { controller }
    }

    /// Controller in use.
    #[must_use]
    pub const fn controller(&self) -> &C {
        &self.controller
    }

    /// Creates a T1 router and logical switch for `subnet`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError`] naming the failing step once every
    /// created resource has been compensated.
    pub async fn create_infrastructure(
        &self,
        subnet: &Subnet,
    ) -> Result<NetworkTopology, ProvisioningError<C::Error>> {
        self.create_infrastructure_with_cancellation(subnet, &CancellationToken::new())
            .await
    }

    /// Like [`NetworkProvisioner::create_infrastructure`], stopping before the
    /// next step once `cancel` fires.
    ///
    /// A step already in flight finishes first so its resource is recorded
    /// and compensated.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError`] with a [`StepFailure::Cancelled`] cause
    /// when cancelled, otherwise as for `create_infrastructure`.
    pub async fn create_infrastructure_with_cancellation(
        &self,
        subnet: &Subnet,
        cancel: &CancellationToken,
    ) -> Result<NetworkTopology, ProvisioningError<C::Error>> {
        let ip_subnet = subnet.ip_subnet();
        let mut ledger = ProvisioningLedger::new();
        info!(subnet = %ip_subnet, "creating network infrastructure");

        for step in ProvisioningStep::ORDER {
            let outcome = if cancel.is_cancelled() {
                Err(StepFailure::Cancelled { step })
            } else {
                self.run_step(step, subnet, &ip_subnet, &mut ledger).await
            };
            if let Err(cause) = outcome {
                return Err(self.roll_back(step, cause, &ledger).await);
            }
        }

        let Some(switch) = ledger.switch() else {
            let step = ProvisioningStep::AttachSwitchToT1;
            let cause = StepFailure::MissingResource {
                resource: "logical switch",
                step,
            };
            return Err(self.roll_back(step, cause, &ledger).await);
        };
        info!(switch_id = %switch.id, "network infrastructure created");
        Ok(NetworkTopology {
            id: switch.id.clone(),
            display_name: switch.display_name.clone(),
        })
    }

    async fn run_step(
        &self,
        step: ProvisioningStep,
        subnet: &Subnet,
        ip_subnet: &IpSubnet,
        ledger: &mut ProvisioningLedger,
    ) -> Result<(), StepFailure<C::Error>> {
        let properties = subnet.cloud_properties();
        info!(%step, "running provisioning step");
        match step {
            ProvisioningStep::CreateRouter => {
                let router = self
                    .controller
                    .create_t1_router(&properties.edge_cluster_id, properties.t1_name.as_deref())
                    .await
                    .map_err(StepFailure::Controller)?;
                info!(router_id = %router.id, "created T1 router");
                ledger.record_router(router);
            }
            ProvisioningStep::EnableRouteAdvertisement => {
                let router_id = ledger.require_router(step)?;
                self.controller
                    .enable_route_advertisement(router_id)
                    .await
                    .map_err(StepFailure::Controller)?;
            }
            ProvisioningStep::AttachT1ToT0 => {
                let router_id = ledger.require_router(step)?;
                self.controller
                    .attach_t1_to_t0(&properties.t0_router_id, router_id)
                    .await
                    .map_err(StepFailure::Controller)?;
            }
            ProvisioningStep::CreateSwitch => {
                let switch = self
                    .controller
                    .create_logical_switch(
                        &properties.transport_zone_id,
                        properties.switch_name.as_deref(),
                    )
                    .await
                    .map_err(StepFailure::Controller)?;
                info!(switch_id = %switch.id, "created logical switch");
                ledger.record_switch(switch);
            }
            ProvisioningStep::AttachSwitchToT1 => {
                let switch_id = ledger.require_switch(step)?;
                let router_id = ledger.require_router(step)?;
                self.controller
                    .attach_switch_to_t1(switch_id, router_id, ip_subnet)
                    .await
                    .map_err(StepFailure::Controller)?;
            }
        }
        Ok(())
    }

    async fn roll_back(
        &self,
        step: ProvisioningStep,
        cause: StepFailure<C::Error>,
        ledger: &ProvisioningLedger,
    ) -> ProvisioningError<C::Error> {
        error!(%step, error = %cause, "provisioning step failed, rolling back");
        let compensation_failures = ledger.compensate(&self.controller).await;
        ProvisioningError {
            step,
            cause,
            compensation_failures,
        }
    }
}
