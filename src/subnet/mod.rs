//! Subnet definitions and their validation.
//!
//! A [`SubnetDefinition`] is the loosely typed input the CPI receives for a
//! network attachment. [`Subnet::from_definition`] turns it into a validated,
//! immutable [`Subnet`] or reports the first problem found. Validation is pure
//! and deterministic.

mod error;

use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnetwork::Ipv4Network;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::controller::IpSubnet;

pub use error::SubnetError;

/// Cloud property naming the edge cluster that hosts the T1 router.
pub const EDGE_CLUSTER_ID: &str = "edge_cluster_id";
/// Cloud property naming the pre-existing T0 router.
pub const T0_ROUTER_ID: &str = "t0_router_id";
/// Optional cloud property naming the T1 router.
pub const T1_NAME: &str = "t1_name";
/// Cloud property naming the transport zone for the logical switch.
pub const TRANSPORT_ZONE_ID: &str = "transport_zone_id";
/// Optional cloud property naming the logical switch.
pub const SWITCH_NAME: &str = "switch_name";

const IPV4_MAX_PREFIX: u32 = 32;

/// Raw subnet definition as supplied by the orchestration layer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SubnetDefinition {
    /// CIDR block, for example `192.168.111.0/24`.
    #[serde(default)]
    pub range: Option<String>,
    /// Gateway address inside the block, for example `192.168.111.1`.
    #[serde(default)]
    pub gateway: Option<String>,
    /// Provider specific properties; must be a non-empty map.
    #[serde(default)]
    pub cloud_properties: Option<Value>,
}

impl SubnetDefinition {
    /// Creates a definition with every field present.
    #[must_use]
    pub fn new(
        range: impl Into<String>,
        gateway: impl Into<String>,
        cloud_properties: Value,
    ) -> Self {
        Self {
            range: Some(range.into()),
            gateway: Some(gateway.into()),
            cloud_properties: Some(cloud_properties),
        }
    }
}

/// Validated cloud properties of a subnet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubnetCloudProperties {
    /// Edge cluster hosting the T1 router.
    pub edge_cluster_id: String,
    /// T0 router the new T1 router is attached to.
    pub t0_router_id: String,
    /// Display name for the T1 router; `None` lets the controller choose.
    pub t1_name: Option<String>,
    /// Transport zone for the logical switch.
    pub transport_zone_id: String,
    /// Display name for the logical switch; `None` lets the controller choose.
    pub switch_name: Option<String>,
}

impl SubnetCloudProperties {
    fn from_value(value: Option<&Value>) -> Result<Self, SubnetError> {
        let Some(Value::Object(properties)) = value else {
            return Err(SubnetError::MissingCloudProperties);
        };
        if properties.is_empty() {
            return Err(SubnetError::MissingCloudProperties);
        }

        Ok(Self {
            t0_router_id: required_property(properties, T0_ROUTER_ID)?,
            edge_cluster_id: required_property(properties, EDGE_CLUSTER_ID)?,
            transport_zone_id: required_property(properties, TRANSPORT_ZONE_ID)?,
            t1_name: optional_property(properties, T1_NAME),
            switch_name: optional_property(properties, SWITCH_NAME),
        })
    }

    fn to_value(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            EDGE_CLUSTER_ID.to_owned(),
            Value::String(self.edge_cluster_id.clone()),
        );
        properties.insert(
            T0_ROUTER_ID.to_owned(),
            Value::String(self.t0_router_id.clone()),
        );
        properties.insert(
            TRANSPORT_ZONE_ID.to_owned(),
            Value::String(self.transport_zone_id.clone()),
        );
        if let Some(name) = &self.t1_name {
            properties.insert(T1_NAME.to_owned(), Value::String(name.clone()));
        }
        if let Some(name) = &self.switch_name {
            properties.insert(SWITCH_NAME.to_owned(), Value::String(name.clone()));
        }
        Value::Object(properties)
    }
}

fn required_property(
    properties: &Map<String, Value>,
    key: &'static str,
) -> Result<String, SubnetError> {
    match properties.get(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(SubnetError::EmptyCloudProperty { property: key }),
    }
}

// Blank names are treated as absent so the controller picks its default.
fn optional_property(properties: &Map<String, Value>, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
}

fn parse_range(range: Option<&str>) -> Result<Ipv4Network, SubnetError> {
    let cidr = range
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SubnetError::MissingRange)?;

    // The prefix is only judged once the address part is a valid IPv4 address.
    if let Some(bits) = cidr
        .split_once('/')
        .filter(|(address, _)| Ipv4Addr::from_str(address).is_ok())
        .and_then(|(_, prefix)| prefix.parse::<u32>().ok())
        .filter(|bits| *bits > IPV4_MAX_PREFIX)
    {
        return Err(SubnetError::MalformedRange {
            reason: format!("Netmask, {bits}, is out of bounds for IPv4"),
        });
    }

    Ipv4Network::from_str(cidr).map_err(|err| SubnetError::MalformedRange {
        reason: err.to_string(),
    })
}

fn parse_gateway(gateway: Option<&str>) -> Result<Ipv4Addr, SubnetError> {
    gateway
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.contains('/'))
        .and_then(|value| Ipv4Addr::from_str(value).ok())
        .ok_or(SubnetError::InvalidGateway)
}

/// Validated subnet ready for provisioning.
///
/// The gateway is only checked for format; it is not required to fall inside
/// `range`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subnet {
    range: Ipv4Network,
    gateway: Ipv4Addr,
    cloud_properties: SubnetCloudProperties,
}

impl Subnet {
    /// Validates a raw definition.
    ///
    /// Cloud properties are checked first, then `range`, then `gateway`; the
    /// first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SubnetError`] describing the first invalid field.
    pub fn from_definition(definition: &SubnetDefinition) -> Result<Self, SubnetError> {
        let cloud_properties =
            SubnetCloudProperties::from_value(definition.cloud_properties.as_ref())?;
        let range = parse_range(definition.range.as_deref())?;
        let gateway = parse_gateway(definition.gateway.as_deref())?;
        Ok(Self {
            range,
            gateway,
            cloud_properties,
        })
    }

    /// Converts the subnet back into an equivalent raw definition.
    #[must_use]
    pub fn to_definition(&self) -> SubnetDefinition {
        SubnetDefinition::new(
            self.range.to_string(),
            self.gateway.to_string(),
            self.cloud_properties.to_value(),
        )
    }

    /// CIDR block of the subnet as given.
    #[must_use]
    pub const fn range(&self) -> Ipv4Network {
        self.range
    }

    /// Gateway address of the subnet.
    #[must_use]
    pub const fn gateway(&self) -> Ipv4Addr {
        self.gateway
    }

    /// Validated cloud properties.
    #[must_use]
    pub const fn cloud_properties(&self) -> &SubnetCloudProperties {
        &self.cloud_properties
    }

    /// Router-port subnet handed to the controller when attaching the switch.
    #[must_use]
    pub fn ip_subnet(&self) -> IpSubnet {
        IpSubnet::new(self.range, self.gateway)
    }
}

impl TryFrom<&SubnetDefinition> for Subnet {
    type Error = SubnetError;

    fn try_from(value: &SubnetDefinition) -> Result<Self, Self::Error> {
        Self::from_definition(value)
    }
}

#[cfg(test)]
mod tests;
