//! Infrastructure core of a cloud provider interface plugin.
//!
//! Two independent subsystems live here: a network topology saga that
//! creates a routed logical switch on an SDN controller and rolls back on
//! failure, and a datastore file transfer service that finds a healthy host,
//! acquires per-request tickets and retries failing transfers. Both talk to
//! the outside world through capability traits so tests can script them.

pub mod capability;
pub mod config;
pub mod controller;
pub mod datastore;
pub mod http;
pub mod provisioner;
pub mod retry;
pub mod subnet;
pub mod telemetry;
pub mod test_support;
pub mod ticket;
pub mod transfer;

pub use capability::CapabilityFuture;
pub use config::{ConfigError, TransferConfig};
pub use controller::{IpSubnet, LogicalSwitch, Router, SdnController};
pub use datastore::{
    Datastore, DatastoreInventory, Host, HostMount, HostRuntime, NoHealthyHost,
    select_healthy_host,
};
pub use http::{
    BodyError, HeaderValue, Headers, HttpClient, HttpError, HttpMethod, HttpResponse,
    ReqwestHttpClient, TransferBody,
};
pub use provisioner::{
    CompensationFailure, CreatedResource, NetworkProvisioner, NetworkTopology, ProvisioningError,
    ProvisioningLedger, ProvisioningStep, StepFailure,
};
pub use retry::{Attempt, RetryError, RetryPolicy, Retryer};
pub use subnet::{Subnet, SubnetCloudProperties, SubnetDefinition, SubnetError};
pub use ticket::{
    HttpServiceMethod, ServiceTicket, ServiceTicketIssuer, SessionManager, TicketError,
};
pub use transfer::{FileTransferService, TransferError, datastore_url};
