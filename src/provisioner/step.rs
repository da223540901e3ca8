//! Ordered saga steps.

use std::fmt;

/// One forward action of the provisioning saga.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProvisioningStep {
    /// Create the T1 router on the edge cluster.
    CreateRouter,
    /// Enable route advertisement on the new router.
    EnableRouteAdvertisement,
    /// Link the new router beneath the T0 router.
    AttachT1ToT0,
    /// Create the logical switch in the transport zone.
    CreateSwitch,
    /// Attach the switch to the router on the subnet's gateway.
    AttachSwitchToT1,
}

impl ProvisioningStep {
    /// Execution order of the saga.
    pub const ORDER: [Self; 5] = [
        Self::CreateRouter,
        Self::EnableRouteAdvertisement,
        Self::AttachT1ToT0,
        Self::CreateSwitch,
        Self::AttachSwitchToT1,
    ];

    /// Human-readable description used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateRouter => "create T1 router",
            Self::EnableRouteAdvertisement => "enable route advertisement",
            Self::AttachT1ToT0 => "attach T1 router to T0 router",
            Self::CreateSwitch => "create logical switch",
            Self::AttachSwitchToT1 => "attach logical switch to T1 router",
        }
    }
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
