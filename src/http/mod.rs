//! HTTP capability used by the file transfer service.
//!
//! [`HttpClient`] is the narrow seam the transfer service talks through;
//! [`ReqwestHttpClient`] is the production implementation and tests supply
//! scripted doubles.

mod body;
mod reqwest_client;

use std::fmt;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use thiserror::Error;

use crate::capability::CapabilityFuture;

pub use body::{BodyError, TransferBody};
pub use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HeaderName, HeaderValue};
pub use reqwest_client::ReqwestHttpClient;

/// Request headers. Names compare case-insensitively.
pub type Headers = HeaderMap;

/// Content type used for raw datastore payloads.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// HTTP status returned when a datastore path does not exist.
pub const STATUS_NOT_FOUND: u16 = 404;
/// Lowest status code treated as a failure.
pub const FIRST_ERROR_STATUS: u16 = 400;

/// HTTP verbs used by the transfer service.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
}

impl HttpMethod {
    /// Upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of a completed exchange.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Builds a response from parts.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status indicates a failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status >= FIRST_ERROR_STATUS
    }
}

/// Errors raised by an [`HttpClient`] before a status code is available.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum HttpError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Target URL.
        url: String,
        /// Underlying failure.
        message: String,
    },
    /// A header value contains bytes HTTP does not allow.
    #[error("invalid value for header {name}: {message}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Parser detail.
        message: String,
    },
    /// The request payload could not be opened.
    #[error(transparent)]
    Body(#[from] BodyError),
    /// The client itself could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    Client {
        /// Underlying failure.
        message: String,
    },
}

/// Minimal HTTP client capability.
pub trait HttpClient: Send + Sync {
    /// Sends a `GET`.
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError>;

    /// Sends a `PUT` with `body`. File payloads are opened anew on every
    /// call and streamed.
    fn put<'a>(
        &'a self,
        url: &'a str,
        body: &'a TransferBody,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError>;

    /// Sends a `POST` with `body`.
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: &'a TransferBody,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError>;
}

/// Merges `overrides` on top of `base`. Every name present in `overrides`
/// replaces all of its values in `base`, whatever the case it was written in.
#[must_use]
pub fn merge_headers(mut base: Headers, overrides: &Headers) -> Headers {
    for name in overrides.keys() {
        base.remove(name);
        for value in overrides.get_all(name) {
            base.append(name.clone(), value.clone());
        }
    }
    base
}
