//! SDN controller capability consumed by the network provisioner.

use std::fmt;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use serde::Serialize;

use crate::capability::CapabilityFuture;

/// Tier-1 logical router returned by the controller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Router {
    /// Controller-assigned identifier.
    pub id: String,
    /// Display name; controllers default this to the id when no name is given.
    pub display_name: String,
}

/// Logical switch returned by the controller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogicalSwitch {
    /// Controller-assigned identifier.
    pub id: String,
    /// Display name; controllers default this to the id when no name is given.
    pub display_name: String,
}

/// Router-port subnet attached between a logical switch and a T1 router.
///
/// Serialises to the controller's `{"ip_addresses": [...], "prefix_length": n}`
/// shape, where the single address is the gateway the router port answers on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IpSubnet {
    #[serde(skip)]
    network: Ipv4Network,
    ip_addresses: Vec<Ipv4Addr>,
    prefix_length: u8,
}

impl IpSubnet {
    /// Builds a router-port subnet from a CIDR block and its gateway.
    #[must_use]
    pub fn new(network: Ipv4Network, gateway: Ipv4Addr) -> Self {
        Self {
            network,
            ip_addresses: vec![gateway],
            prefix_length: network.prefix(),
        }
    }

    /// CIDR block the subnet was built from, normalised to its network address.
    #[must_use]
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network.network(), self.prefix_length)
    }

    /// Gateway address assigned to the router port.
    #[must_use]
    pub fn gateway(&self) -> Option<Ipv4Addr> {
        self.ip_addresses.first().copied()
    }

    /// Prefix length of the CIDR block.
    #[must_use]
    pub const fn prefix_length(&self) -> u8 {
        self.prefix_length
    }
}

impl fmt::Display for IpSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gateway() {
            Some(gateway) => write!(f, "{} via {gateway}", self.cidr()),
            None => write!(f, "{}", self.cidr()),
        }
    }
}

/// Operations the provisioner needs from an SDN controller.
///
/// Names passed as `None` let the controller choose a default display name.
pub trait SdnController: Send + Sync {
    /// Controller specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a T1 router on the given edge cluster.
    fn create_t1_router<'a>(
        &'a self,
        edge_cluster_id: &'a str,
        name: Option<&'a str>,
    ) -> CapabilityFuture<'a, Router, Self::Error>;

    /// Enables route advertisement on a T1 router.
    fn enable_route_advertisement<'a>(
        &'a self,
        router_id: &'a str,
    ) -> CapabilityFuture<'a, (), Self::Error>;

    /// Links a T1 router beneath an existing T0 router.
    fn attach_t1_to_t0<'a>(
        &'a self,
        t0_router_id: &'a str,
        t1_router_id: &'a str,
    ) -> CapabilityFuture<'a, (), Self::Error>;

    /// Deletes a T1 router.
    fn delete_t1_router<'a>(&'a self, router_id: &'a str) -> CapabilityFuture<'a, (), Self::Error>;

    /// Creates a logical switch in the given transport zone.
    fn create_logical_switch<'a>(
        &'a self,
        transport_zone_id: &'a str,
        name: Option<&'a str>,
    ) -> CapabilityFuture<'a, LogicalSwitch, Self::Error>;

    /// Deletes a logical switch.
    fn delete_logical_switch<'a>(
        &'a self,
        switch_id: &'a str,
    ) -> CapabilityFuture<'a, (), Self::Error>;

    /// Attaches a logical switch to a T1 router through a port on `subnet`.
    fn attach_switch_to_t1<'a>(
        &'a self,
        switch_id: &'a str,
        router_id: &'a str,
        subnet: &'a IpSubnet,
    ) -> CapabilityFuture<'a, (), Self::Error>;
}
