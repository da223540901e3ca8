//! Datastore file transfers over HTTP.
//!
//! [`FileTransferService`] locates a healthy host for a datastore, obtains a
//! fresh service ticket for every attempt and moves payloads with the
//! [`Retryer`]. Failing statuses are retried; a `404` on fetch means the file
//! does not exist and is reported as `Ok(None)`.

mod error;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::datastore::{DatastoreInventory, select_healthy_host};
use crate::http::{
    CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HeaderValue, Headers, HttpClient, HttpError,
    HttpMethod, HttpResponse, OCTET_STREAM, STATUS_NOT_FOUND, TransferBody, merge_headers,
};
use crate::retry::{Attempt, Retryer};
use crate::ticket::{HttpServiceMethod, ServiceTicketIssuer, SessionManager};

pub use error::TransferError;

/// Builds the datastore file URL served by `host`.
#[must_use]
pub fn datastore_url(host: &str, path: &str, datastore: &str) -> String {
    format!(
        "https://{host}/folder/{path}?dsName={}",
        urlencoding::encode(datastore)
    )
}

struct TransferRequest<'a> {
    method: HttpMethod,
    url: &'a str,
    ticket: Option<HttpServiceMethod>,
    body: Option<TransferBody>,
    content_length: Option<u64>,
    headers: Headers,
    allow_not_found: bool,
}

/// Moves files between the local process and datastores.
#[derive(Clone, Debug)]
pub struct FileTransferService<H, S> {
    http: H,
    tickets: ServiceTicketIssuer<S>,
    retryer: Retryer,
    cancellation: Option<CancellationToken>,
}

impl<H, S> FileTransferService<H, S>
where
    H: HttpClient,
    S: SessionManager,
{
    /// Creates a service with the default retry policy.
    #[must_use]
    pub fn new(http: H, session: S) -> Self {
        Self {
            http,
            tickets: ServiceTicketIssuer::new(session),
            retryer: Retryer::default(),
            cancellation: None,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retryer(mut self, retryer: Retryer) -> Self {
        self.retryer = retryer;
        self
    }

    /// Aborts retry delays once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// HTTP capability in use.
    #[must_use]
    pub const fn http(&self) -> &H {
        &self.http
    }

    /// Session manager in use.
    #[must_use]
    pub const fn session(&self) -> &S {
        self.tickets.session()
    }

    /// Downloads `path` from `datastore`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::NoHealthyHost`] when no mount can serve the
    /// request, or the last attempt's error once retries are exhausted.
    pub async fn fetch_from_datastore<D>(
        &self,
        datacenter: &str,
        datastore: &D,
        path: &str,
    ) -> Result<Option<Bytes>, TransferError>
    where
        D: DatastoreInventory + ?Sized,
    {
        let host = select_healthy_host(datastore)?;
        let url = datastore_url(&host.name, path, datastore.name());

        info!(%url, datacenter, host = %host.name, "Fetching file from {url}...");
        let request = TransferRequest {
            method: HttpMethod::Get,
            url: &url,
            ticket: Some(HttpServiceMethod::HttpGet),
            body: None,
            content_length: None,
            headers: octet_stream_headers(),
            allow_not_found: true,
        };

        let Some(response) = self.execute(&request).await? else {
            info!(%url, "Could not find file at {url}.");
            return Ok(None);
        };
        info!(%url, "Successfully downloaded file.");
        Ok(Some(response.body))
    }

    /// Uploads `body` to `path` on `datastore`.
    ///
    /// File payloads are streamed from disk and reopened on every attempt.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::NoHealthyHost`], [`TransferError::Body`] when
    /// a file payload cannot be read, or the last attempt's error once
    /// retries are exhausted.
    pub async fn upload_to_datastore<D>(
        &self,
        datastore: &D,
        path: &str,
        body: TransferBody,
    ) -> Result<(), TransferError>
    where
        D: DatastoreInventory + ?Sized,
    {
        let host = select_healthy_host(datastore)?;
        let url = datastore_url(&host.name, path, datastore.name());
        let content_length = body.content_length().await?;

        info!(%url, host = %host.name, "Uploading file to {url}...");
        let request = TransferRequest {
            method: HttpMethod::Put,
            url: &url,
            ticket: Some(HttpServiceMethod::HttpPut),
            body: Some(body),
            content_length: Some(content_length),
            headers: octet_stream_headers(),
            allow_not_found: false,
        };

        self.execute(&request).await?;
        info!(%url, "Successfully uploaded file.");
        Ok(())
    }

    /// Posts `body` directly to `url` without host selection or a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Body`] when a file payload cannot be read, or
    /// the last attempt's error once retries are exhausted.
    pub async fn upload_to_url(
        &self,
        url: &str,
        body: TransferBody,
        headers: Headers,
    ) -> Result<(), TransferError> {
        let content_length = body.content_length().await?;

        info!(%url, "Uploading file to {url}...");
        let request = TransferRequest {
            method: HttpMethod::Post,
            url,
            ticket: None,
            body: Some(body),
            content_length: Some(content_length),
            headers,
            allow_not_found: false,
        };

        self.execute(&request).await?;
        info!(%url, "Successfully uploaded file.");
        Ok(())
    }

    async fn execute(
        &self,
        request: &TransferRequest<'_>,
    ) -> Result<Option<HttpResponse>, TransferError> {
        let outcome = match &self.cancellation {
            Some(token) => {
                self.retryer
                    .try_with_cancellation(token, move |attempt| self.attempt(request, attempt))
                    .await
            }
            None => {
                self.retryer
                    .try_async(move |attempt| self.attempt(request, attempt))
                    .await
            }
        };
        outcome.map_err(|err| TransferError::from_retry(err, request.url))
    }

    async fn attempt(
        &self,
        request: &TransferRequest<'_>,
        attempt: u32,
    ) -> Result<Option<HttpResponse>, Attempt<TransferError>> {
        let mut caller_headers = request.headers.clone();
        if let Some(method) = request.ticket {
            let ticket = self
                .tickets
                .issue(request.url, method)
                .await
                .map_err(|err| Attempt::Transient(TransferError::from(err)))?;
            let cookie = HeaderValue::from_str(&ticket.cookie()).map_err(|err| {
                Attempt::Permanent(TransferError::from(HttpError::InvalidHeader {
                    name: COOKIE.to_string(),
                    message: err.to_string(),
                }))
            })?;
            caller_headers.insert(COOKIE, cookie);
        }

        let mut base = Headers::new();
        if let Some(length) = request.content_length {
            base.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
        let headers = merge_headers(base, &caller_headers);

        let empty = TransferBody::Bytes(Bytes::new());
        let body = request.body.as_ref().unwrap_or(&empty);
        let sent = match request.method {
            HttpMethod::Get => self.http.get(request.url, &headers).await,
            HttpMethod::Put => self.http.put(request.url, body, &headers).await,
            HttpMethod::Post => self.http.post(request.url, body, &headers).await,
        };
        let response = sent.map_err(|err| match err {
            HttpError::Body(source) => Attempt::Permanent(TransferError::Body(source)),
            other => {
                warn!(url = request.url, attempt, error = %other, "transfer request failed");
                Attempt::Transient(TransferError::from(other))
            }
        })?;

        if response.status == STATUS_NOT_FOUND && request.allow_not_found {
            return Ok(None);
        }
        if response.is_error() {
            let error = TransferError::Status {
                url: request.url.to_owned(),
                status: response.status,
            };
            warn!(url = request.url, attempt, status = response.status, "{error}");
            return Err(Attempt::Transient(error));
        }
        Ok(Some(response))
    }
}

fn octet_stream_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
    headers
}
