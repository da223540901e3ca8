//! [`HttpClient`] implementation backed by `reqwest`.

use std::time::Duration;

use super::{Headers, HttpClient, HttpError, HttpMethod, HttpResponse, TransferBody};
use crate::capability::CapabilityFuture;

/// Production HTTP client.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Builds a client with a per-request timeout.
    ///
    /// `skip_ssl_verify` accepts self-signed host certificates, which lab
    /// hypervisors commonly present.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Client`] when the TLS backend cannot initialise.
    pub fn new(timeout: Duration, skip_ssl_verify: bool) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(skip_ssl_verify)
            .build()
            .map_err(|err| HttpError::Client {
                message: err.to_string(),
            })?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&TransferBody>,
        headers: &Headers,
    ) -> Result<HttpResponse, HttpError> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Post => self.client.post(url),
        }
        .headers(headers.clone());
        if let Some(payload) = body {
            request = request.body(payload.request_body().await?);
        }

        let response = request.send().await.map_err(|err| transport(url, &err))?;
        let status = response.status().as_u16();
        let payload = response.bytes().await.map_err(|err| transport(url, &err))?;
        Ok(HttpResponse::new(status, payload))
    }
}

fn transport(url: &str, err: &reqwest::Error) -> HttpError {
    HttpError::Transport {
        url: url.to_owned(),
        message: err.to_string(),
    }
}

impl HttpClient for ReqwestHttpClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError> {
        Box::pin(self.send(HttpMethod::Get, url, None, headers))
    }

    fn put<'a>(
        &'a self,
        url: &'a str,
        body: &'a TransferBody,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError> {
        Box::pin(self.send(HttpMethod::Put, url, Some(body), headers))
    }

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: &'a TransferBody,
        headers: &'a Headers,
    ) -> CapabilityFuture<'a, HttpResponse, HttpError> {
        Box::pin(self.send(HttpMethod::Post, url, Some(body), headers))
    }
}
