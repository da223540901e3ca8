//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

#![expect(dead_code, reason = "each test crate uses a different subset")]

/// CIDR block used by the reference subnet definition.
pub const RANGE: &str = "192.168.111.0/24";
/// Gateway used by the reference subnet definition.
pub const GATEWAY: &str = "192.168.111.1";
/// Edge cluster hosting the T1 router.
pub const EDGE_CLUSTER_ID: &str = "cluster_id";
/// Pre-existing T0 router.
pub const T0_ROUTER_ID: &str = "t0-router-id";
/// Transport zone for the logical switch.
pub const TRANSPORT_ZONE_ID: &str = "zone-id";
/// Requested T1 router name.
pub const ROUTER_NAME: &str = "router-name";
/// Requested logical switch name.
pub const SWITCH_NAME: &str = "switch-name";
/// Controller error used to inject failures.
pub const NSXT_ERROR: &str = "Some nsxt error";
/// Datastore used by transfer tests.
pub const DATASTORE: &str = "ds-1";
/// Healthy host serving the datastore.
pub const HOST: &str = "esx-1";
