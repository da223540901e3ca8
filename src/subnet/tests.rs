//! Unit tests for subnet validation helpers.

use serde_json::json;

use super::*;

fn definition(cloud_properties: Value) -> SubnetDefinition {
    SubnetDefinition::new("192.168.111.0/24", "192.168.111.1", cloud_properties)
}

#[test]
fn optional_names_default_to_none_when_blank() {
    let subnet = Subnet::from_definition(&definition(json!({
        "edge_cluster_id": "cluster_id",
        "t0_router_id": "t0-router-id",
        "transport_zone_id": "zone-id",
        "t1_name": "  ",
        "switch_name": null,
    })))
    .expect("definition should validate");

    assert_eq!(subnet.cloud_properties().t1_name, None);
    assert_eq!(subnet.cloud_properties().switch_name, None);
}

#[test]
fn non_string_required_property_is_rejected() {
    let error = Subnet::from_definition(&definition(json!({
        "edge_cluster_id": 42,
        "t0_router_id": "t0-router-id",
        "transport_zone_id": "zone-id",
    })))
    .expect_err("numeric id should fail");

    assert_eq!(
        error,
        SubnetError::EmptyCloudProperty {
            property: EDGE_CLUSTER_ID
        }
    );
}

#[test]
fn cloud_properties_are_checked_before_range() {
    let raw = SubnetDefinition {
        range: None,
        gateway: None,
        cloud_properties: Some(json!([])),
    };
    let error = Subnet::from_definition(&raw).expect_err("list is not a map");
    assert_eq!(error, SubnetError::MissingCloudProperties);
}

#[test]
fn parse_range_reports_ipv4_netmask_bounds() {
    let error = parse_range(Some("192.168.111.111/33")).expect_err("netmask 33");
    assert_eq!(
        error.to_string(),
        "Incorrect subnet definition. Proper CIDR block range must be given: \
         Netmask, 33, is out of bounds for IPv4"
    );
}

#[test]
fn parse_range_rejects_garbage() {
    let error = parse_range(Some("not-a-cidr")).expect_err("garbage");
    assert!(matches!(error, SubnetError::MalformedRange { .. }));
}

#[test]
fn parse_gateway_rejects_prefix_suffix() {
    assert_eq!(
        parse_gateway(Some("192.168.111.111/31")),
        Err(SubnetError::InvalidGateway)
    );
}

#[test]
fn parse_gateway_accepts_bare_address() {
    assert_eq!(
        parse_gateway(Some("192.168.111.1")),
        Ok(Ipv4Addr::new(192, 168, 111, 1))
    );
}

#[test]
fn gateway_outside_range_is_accepted() {
    let subnet = Subnet::from_definition(&SubnetDefinition::new(
        "192.168.111.0/24",
        "10.0.0.1",
        json!({
            "edge_cluster_id": "cluster_id",
            "t0_router_id": "t0-router-id",
            "transport_zone_id": "zone-id",
        }),
    ))
    .expect("containment is not validated");

    assert_eq!(subnet.gateway(), Ipv4Addr::new(10, 0, 0, 1));
}

#[test]
fn to_definition_round_trips_optional_names() {
    let subnet = Subnet::from_definition(&definition(json!({
        "edge_cluster_id": "cluster_id",
        "t0_router_id": "t0-router-id",
        "transport_zone_id": "zone-id",
        "t1_name": "router-name",
    })))
    .expect("valid");

    let again = Subnet::from_definition(&subnet.to_definition()).expect("still valid");
    assert_eq!(again, subnet);
    assert_eq!(again.cloud_properties().t1_name.as_deref(), Some("router-name"));
}
