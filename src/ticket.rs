//! Service tickets scoped to one URL and HTTP method.
//!
//! The hypervisor authorises datastore file access through single-use
//! tickets. [`ServiceTicketIssuer`] asks the session manager for a fresh one
//! on every call and never caches the result.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::capability::CapabilityFuture;

/// HTTP method a generic service ticket is scoped to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HttpServiceMethod {
    /// Ticket for `GET` requests.
    HttpGet,
    /// Ticket for `PUT` requests.
    HttpPut,
    /// Ticket for `POST` requests.
    HttpPost,
}

impl HttpServiceMethod {
    /// Wire name expected by the session manager.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HttpGet => "httpGet",
            Self::HttpPut => "httpPut",
            Self::HttpPost => "httpPost",
        }
    }
}

impl fmt::Display for HttpServiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-lived credential authorising one request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceTicket {
    /// Opaque ticket identifier, sent as the `vmware_cgi_ticket` cookie.
    pub id: String,
}

impl ServiceTicket {
    /// Wraps a ticket identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Cookie header value carrying this ticket.
    #[must_use]
    pub fn cookie(&self) -> String {
        format!("vmware_cgi_ticket={}", self.id)
    }
}

/// Errors raised while acquiring a ticket.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TicketError {
    /// The session manager refused or failed to issue a ticket.
    #[error("failed to acquire service ticket for {method} {url}: {message}")]
    Acquire {
        /// URL the ticket was requested for.
        url: String,
        /// Method the ticket was requested for.
        method: HttpServiceMethod,
        /// Description of the failure.
        message: String,
    },
}

/// Hypervisor session able to mint generic service tickets.
pub trait SessionManager: Send + Sync {
    /// Acquires a ticket valid for one request of `method` against `url`.
    fn acquire_generic_service_ticket<'a>(
        &'a self,
        url: &'a str,
        method: HttpServiceMethod,
    ) -> CapabilityFuture<'a, ServiceTicket, TicketError>;
}

/// Issues a fresh ticket per request.
#[derive(Clone, Debug)]
pub struct ServiceTicketIssuer<S> {
    session: S,
}

impl<S> ServiceTicketIssuer<S>
where
    S: SessionManager,
{
    /// Wraps a session manager.
    #[must_use]
    pub const fn new(session: S) -> Self {
        Self { session }
    }

    /// Session manager backing this issuer.
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Requests a new ticket for `url` and `method`.
    ///
    /// # Errors
    ///
    /// Propagates [`TicketError`] from the session manager.
    pub async fn issue(
        &self,
        url: &str,
        method: HttpServiceMethod,
    ) -> Result<ServiceTicket, TicketError> {
        info!(
            url,
            %method,
            "Acquiring generic service ticket for URL: {url} and Method: {method}"
        );
        self.session.acquire_generic_service_ticket(url, method).await
    }
}
