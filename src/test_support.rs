//! Test support utilities shared across unit and integration tests.
//!
//! The scripted doubles record every call behind an `Arc<Mutex<_>>`, so a
//! test can keep a clone for assertions after handing the double to the code
//! under test.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::capability::CapabilityFuture;
use crate::controller::{IpSubnet, LogicalSwitch, Router, SdnController};
use crate::http::{Headers, HttpClient, HttpError, HttpMethod, HttpResponse, TransferBody};
use crate::ticket::{HttpServiceMethod, ServiceTicket, SessionManager, TicketError};

/// Router id returned by [`ScriptedController`].
pub const SCRIPTED_ROUTER_ID: &str = "t1-router-id";
/// Switch id returned by [`ScriptedController`].
pub const SCRIPTED_SWITCH_ID: &str = "switch-id";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Controller operations that can be scripted to fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ControllerOperation {
    /// `create_t1_router`
    CreateT1Router,
    /// `enable_route_advertisement`
    EnableRouteAdvertisement,
    /// `attach_t1_to_t0`
    AttachT1ToT0,
    /// `create_logical_switch`
    CreateLogicalSwitch,
    /// `attach_switch_to_t1`
    AttachSwitchToT1,
    /// `delete_logical_switch`
    DeleteLogicalSwitch,
    /// `delete_t1_router`
    DeleteT1Router,
}

/// A call received by [`ScriptedController`], with its arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ControllerCall {
    /// `create_t1_router(edge_cluster_id, name)`
    CreateT1Router {
        /// Edge cluster argument.
        edge_cluster_id: String,
        /// Requested display name.
        name: Option<String>,
    },
    /// `enable_route_advertisement(router_id)`
    EnableRouteAdvertisement {
        /// Router argument.
        router_id: String,
    },
    /// `attach_t1_to_t0(t0_router_id, t1_router_id)`
    AttachT1ToT0 {
        /// T0 router argument.
        t0_router_id: String,
        /// T1 router argument.
        t1_router_id: String,
    },
    /// `create_logical_switch(transport_zone_id, name)`
    CreateLogicalSwitch {
        /// Transport zone argument.
        transport_zone_id: String,
        /// Requested display name.
        name: Option<String>,
    },
    /// `attach_switch_to_t1(switch_id, router_id, subnet)`
    AttachSwitchToT1 {
        /// Switch argument.
        switch_id: String,
        /// Router argument.
        router_id: String,
        /// Router-port subnet argument.
        subnet: IpSubnet,
    },
    /// `delete_logical_switch(switch_id)`
    DeleteLogicalSwitch {
        /// Switch argument.
        switch_id: String,
    },
    /// `delete_t1_router(router_id)`
    DeleteT1Router {
        /// Router argument.
        router_id: String,
    },
}

impl ControllerCall {
    /// Operation this call invoked.
    #[must_use]
    pub const fn operation(&self) -> ControllerOperation {
        match self {
            Self::CreateT1Router { .. } => ControllerOperation::CreateT1Router,
            Self::EnableRouteAdvertisement { .. } => ControllerOperation::EnableRouteAdvertisement,
            Self::AttachT1ToT0 { .. } => ControllerOperation::AttachT1ToT0,
            Self::CreateLogicalSwitch { .. } => ControllerOperation::CreateLogicalSwitch,
            Self::AttachSwitchToT1 { .. } => ControllerOperation::AttachSwitchToT1,
            Self::DeleteLogicalSwitch { .. } => ControllerOperation::DeleteLogicalSwitch,
            Self::DeleteT1Router { .. } => ControllerOperation::DeleteT1Router,
        }
    }
}

/// Error returned by [`ScriptedController`] for scripted failures.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct ScriptedControllerError {
    /// Scripted message.
    pub message: String,
}

#[derive(Debug, Default)]
struct ControllerState {
    calls: Vec<ControllerCall>,
    failures: HashMap<ControllerOperation, String>,
    cancel_on: Option<(ControllerOperation, CancellationToken)>,
}

/// In-memory [`SdnController`] that records calls and fails on demand.
///
/// Created routers get the id `t1-router-id`, switches `switch-id`; display
/// names echo the requested name or fall back to the id.
#[derive(Clone, Debug, Default)]
pub struct ScriptedController {
    state: Arc<Mutex<ControllerState>>,
}

impl ScriptedController {
    /// Creates a controller on which every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `operation` fail with `message`.
    #[must_use]
    pub fn fail_on(self, operation: ControllerOperation, message: impl Into<String>) -> Self {
        lock(&self.state)
            .failures
            .insert(operation, message.into());
        self
    }

    /// Cancels `token` while `operation` is in flight.
    #[must_use]
    pub fn cancel_on(self, operation: ControllerOperation, token: CancellationToken) -> Self {
        lock(&self.state).cancel_on = Some((operation, token));
        self
    }

    /// Calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ControllerCall> {
        lock(&self.state).calls.clone()
    }

    /// Operations invoked so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<ControllerOperation> {
        lock(&self.state)
            .calls
            .iter()
            .map(ControllerCall::operation)
            .collect()
    }

    fn record(&self, call: ControllerCall) -> Result<(), ScriptedControllerError> {
        let operation = call.operation();
        let mut state = lock(&self.state);
        state.calls.push(call);
        if let Some((target, token)) = &state.cancel_on {
            if *target == operation {
                token.cancel();
            }
        }
        state
            .failures
            .get(&operation)
            .map_or(Ok(()), |message| {
                Err(ScriptedControllerError {
                    message: message.clone(),
                })
            })
    }
}

fn display_name(name: Option<&str>, id: &str) -> String {
    name.unwrap_or(id).to_owned()
}

impl SdnController for ScriptedController {
    type Error = ScriptedControllerError;

    fn create_t1_router<'a>(
        &'a self,
        edge_cluster_id: &'a str,
        name: Option<&'a str>,
    ) -> CapabilityFuture<'a, Router, Self::Error> {
        Box::pin(async move {
            self.record(ControllerCall::CreateT1Router {
                edge_cluster_id: edge_cluster_id.to_owned(),
                name: name.map(str::to_owned),
            })?;
            Ok(Router {
                id: SCRIPTED_ROUTER_ID.to_owned(),
                display_name: display_name(name, SCRIPTED_ROUTER_ID),
            })
        })
    }

    fn enable_route_advertisement<'a>(
        &'a self,
        router_id: &'a str,
    ) -> CapabilityFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(ControllerCall::EnableRouteAdvertisement {
                router_id: router_id.to_owned(),
            })
        })
    }

    fn attach_t1_to_t0<'a>(
        &'a self,
        t0_router_id: &'a str,
        t1_router_id: &'a str,
    ) -> CapabilityFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(ControllerCall::AttachT1ToT0 {
                t0_router_id: t0_router_id.to_owned(),
                t1_router_id: t1_router_id.to_owned(),
            })
        })
    }

    fn delete_t1_router<'a>(&'a self, router_id: &'a str) -> CapabilityFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(ControllerCall::DeleteT1Router {
                router_id: router_id.to_owned(),
            })
        })
    }

    fn create_logical_switch<'a>(
        &'a self,
        transport_zone_id: &'a str,
        name: Option<&'a str>,
    ) -> CapabilityFuture<'a, LogicalSwitch, Self::Error> {
        Box::pin(async move {
            self.record(ControllerCall::CreateLogicalSwitch {
                transport_zone_id: transport_zone_id.to_owned(),
                name: name.map(str::to_owned),
            })?;
            Ok(LogicalSwitch {
                id: SCRIPTED_SWITCH_ID.to_owned(),
                display_name: display_name(name, SCRIPTED_SWITCH_ID),
            })
        })
    }

    fn delete_logical_switch<'a>(
        &'a self,
        switch_id: &'a str,
    ) -> CapabilityFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(ControllerCall::DeleteLogicalSwitch {
                switch_id: switch_id.to_owned(),
            })
        })
    }

    fn attach_switch_to_t1<'a>(
        &'a self,
        switch_id: &'a str,
        router_id: &'a str,
        subnet: &'a IpSubnet,
    ) -> CapabilityFuture<'a, (), Self::Error> {
        Box::pin(async move {
            self.record(ControllerCall::AttachSwitchToT1 {
                switch_id: switch_id.to_owned(),
                router_id: router_id.to_owned(),
                subnet: subnet.clone(),
            })
        })
    }
}

/// A request received by [`ScriptedHttpClient`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpCall {
    /// Verb used.
    pub method: HttpMethod,
    /// Target URL.
    pub url: String,
    /// Headers as sent.
    pub headers: Headers,
    /// Payload for `PUT` and `POST`, as read during this call.
    pub body: Option<Bytes>,
}

impl HttpCall {
    /// Value of header `name`, if sent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Debug, Default)]
struct HttpState {
    responses: VecDeque<Result<HttpResponse, HttpError>>,
    calls: Vec<HttpCall>,
}

/// [`HttpClient`] that replays queued responses in FIFO order.
///
/// Payloads are read afresh on every call, so file bodies reflect the file
/// contents at the time of each attempt. Once the queue is empty every
/// request fails with a transport error.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHttpClient {
    state: Arc<Mutex<HttpState>>,
}

impl ScriptedHttpClient {
    /// Creates a client with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with `status` and `body`.
    pub fn push_response(&self, status: u16, body: impl Into<Bytes>) {
        lock(&self.state)
            .responses
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queues `count` empty responses with `status`.
    pub fn push_statuses(&self, status: u16, count: usize) {
        let mut state = lock(&self.state);
        for _ in 0..count {
            state
                .responses
                .push_back(Ok(HttpResponse::new(status, Bytes::new())));
        }
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: HttpError) {
        lock(&self.state).responses.push_back(Err(error));
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<HttpCall> {
        lock(&self.state).calls.clone()
    }

    fn respond(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Bytes>,
        headers: &Headers,
    ) -> Result<HttpResponse, HttpError> {
        let mut state = lock(&self.state);
        state.calls.push(HttpCall {
            method,
            url: url.to_owned(),
            headers: headers.clone(),
            body,
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| {
                Err(HttpError::Transport {
                    url: url.to_owned(),
                    message: String::from("no scripted response available"),
                })
            })
    }
}

impl HttpClient for ScriptedHttpClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError> {
        Box::pin(async move { self.respond(HttpMethod::Get, url, None, headers) })
    }

    fn put<'a>(
        &'a self,
        url: &'a str,
        body: &'a TransferBody,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError> {
        Box::pin(async move {
            let payload = body.read().await?;
            self.respond(HttpMethod::Put, url, Some(payload), headers)
        })
    }

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: &'a TransferBody,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError> {
        Box::pin(async move {
            let payload = body.read().await?;
            self.respond(HttpMethod::Post, url, Some(payload), headers)
        })
    }
}

#[derive(Debug, Default)]
struct SessionState {
    requests: Vec<(String, HttpServiceMethod)>,
    issued: u32,
    failures_remaining: u32,
    failure_message: String,
}

/// [`SessionManager`] issuing `ticket-1`, `ticket-2`, ... in order.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSessionManager {
    state: Arc<Mutex<SessionState>>,
}

impl ScriptedSessionManager {
    /// Creates a session manager that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `times` requests with `message`.
    #[must_use]
    pub fn failing(self, times: u32, message: impl Into<String>) -> Self {
        {
            let mut state = lock(&self.state);
            state.failures_remaining = times;
            state.failure_message = message.into();
        }
        self
    }

    /// Ticket requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, HttpServiceMethod)> {
        lock(&self.state).requests.clone()
    }
}

impl SessionManager for ScriptedSessionManager {
    fn acquire_generic_service_ticket<'a>(
        &'a self,
        url: &'a str,
        method: HttpServiceMethod,
    ) -> CapabilityFuture<'a, ServiceTicket, TicketError> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.requests.push((url.to_owned(), method));
            if state.failures_remaining > 0 {
                state.failures_remaining -= 1;
                return Err(TicketError::Acquire {
                    url: url.to_owned(),
                    method,
                    message: state.failure_message.clone(),
                });
            }
            state.issued += 1;
            Ok(ServiceTicket::new(format!("ticket-{}", state.issued)))
        })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: tokio::sync::MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
