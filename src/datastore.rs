//! Datastore inventory snapshots and healthy host selection.

use thiserror::Error;

/// Power state reported by a host that is running.
pub const POWERED_ON: &str = "poweredOn";
/// Connection state reported by a host the hypervisor manager can reach.
pub const CONNECTED: &str = "connected";

/// Runtime status of a host as reported by the inventory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostRuntime {
    /// Whether the host is in maintenance mode.
    pub in_maintenance_mode: bool,
    /// Power state, for example `poweredOn` or `standBy`.
    pub power_state: String,
    /// Connection state, for example `connected` or `disconnected`.
    pub connection_state: String,
}

impl HostRuntime {
    /// Runtime of a powered-on, connected host outside maintenance mode.
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            in_maintenance_mode: false,
            power_state: POWERED_ON.to_owned(),
            connection_state: CONNECTED.to_owned(),
        }
    }
}

/// Hypervisor host mounting a datastore.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Host {
    /// Host name, used as the authority of datastore URLs.
    pub name: String,
    /// Current runtime status.
    pub runtime: HostRuntime,
}

impl Host {
    /// Creates a host with the given runtime status.
    #[must_use]
    pub fn new(name: impl Into<String>, runtime: HostRuntime) -> Self {
        Self {
            name: name.into(),
            runtime,
        }
    }

    /// Whether the host can serve datastore file requests.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        !self.runtime.in_maintenance_mode
            && self.runtime.power_state == POWERED_ON
            && self.runtime.connection_state == CONNECTED
    }
}

/// A host's mount of a datastore.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostMount {
    /// Host holding the mount.
    pub host: Host,
}

impl From<Host> for HostMount {
    fn from(host: Host) -> Self {
        Self { host }
    }
}

/// Read-only view of a datastore and the hosts that mount it.
pub trait DatastoreInventory {
    /// Datastore name as known to the hypervisor.
    fn name(&self) -> &str;

    /// Host mounts in inventory order.
    fn host_mounts(&self) -> &[HostMount];
}

/// Owned datastore snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Datastore {
    name: String,
    mounts: Vec<HostMount>,
}

impl Datastore {
    /// Creates a snapshot from a name and its host mounts.
    #[must_use]
    pub fn new(name: impl Into<String>, mounts: Vec<HostMount>) -> Self {
        Self {
            name: name.into(),
            mounts,
        }
    }
}

impl DatastoreInventory for Datastore {
    fn name(&self) -> &str {
        &self.name
    }

    fn host_mounts(&self) -> &[HostMount] {
        &self.mounts
    }
}

/// Raised when no mount of a datastore is on a healthy host.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("no healthy host available for datastore '{datastore}'")]
pub struct NoHealthyHost {
    /// Name of the datastore that was searched.
    pub datastore: String,
}

/// Returns the first host, in mount order, that is healthy.
///
/// # Errors
///
/// Returns [`NoHealthyHost`] when every mount is unhealthy or there are none.
pub fn select_healthy_host<D>(datastore: &D) -> Result<&Host, NoHealthyHost>
where
    D: DatastoreInventory + ?Sized,
{
    datastore
        .host_mounts()
        .iter()
        .map(|mount| &mount.host)
        .find(|host| host.is_healthy())
        .ok_or_else(|| NoHealthyHost {
            datastore: datastore.name().to_owned(),
        })
}
