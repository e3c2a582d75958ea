//! Configurable HTTP client dispatching through a pluggable transport.
//!
//! # Design
//! `Client` holds only configuration and its transport. A request moves
//! through four stages: `prepare` resolves the effective settings and runs the
//! request transforms, the transport is awaited once, and
//! `PreparedRequest::finish` runs the response transforms and applies
//! validate-status. `prepare` and `finish` are public so callers that perform
//! the I/O themselves can skip the transport entirely.
//!
//! Requests borrow the client immutably. Reconfiguration takes `&mut self`,
//! so it cannot race an in-flight request, and every request works on its own
//! snapshot of the transform chains.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::builder::{PreparedRequest, RequestBuilder, RequestOptions};
use crate::config::{default_validate_status, ClientConfig, DefaultHeaders, ValidateStatus};
use crate::error::{BoxError, Error, TransportError};
use crate::http::{Headers, HttpMethod, HttpResponse};
use crate::payload::Payload;
use crate::response::ResponseEnvelope;
use crate::transform::{RequestChain, ResponseChain};
use crate::transport::Transport;

/// Long-lived client: defaults applied to every request plus the transport.
#[derive(Clone)]
pub struct Client<T> {
    transport: T,
    base_url: Option<String>,
    default_headers: DefaultHeaders,
    validate_status: ValidateStatus,
    transform_requests: RequestChain,
    transform_responses: ResponseChain,
}

impl<T> Client<T> {
    /// Client with default headers, 2xx validation and the default JSON
    /// transforms.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url,
            default_headers: config.default_headers,
            validate_status: config
                .validate_status
                .unwrap_or_else(|| Arc::new(default_validate_status)),
            transform_requests: config
                .transform_requests
                .unwrap_or_else(RequestChain::with_default),
            transform_responses: config
                .transform_responses
                .unwrap_or_else(ResponseChain::with_default),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn set_base_url(&mut self, base_url: Option<String>) {
        self.base_url = base_url;
    }

    pub fn default_headers(&self) -> &DefaultHeaders {
        &self.default_headers
    }

    pub fn default_headers_mut(&mut self) -> &mut DefaultHeaders {
        &mut self.default_headers
    }

    pub fn set_validate_status<F>(&mut self, validate: F)
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.validate_status = Arc::new(validate);
    }

    pub fn push_request_transform<F>(&mut self, transform: F)
    where
        F: Fn(Payload, &mut Headers) -> Result<Payload, BoxError> + Send + Sync + 'static,
    {
        self.transform_requests.push(transform);
    }

    pub fn push_response_transform<F>(&mut self, transform: F)
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.transform_responses.push(transform);
    }

    pub fn transform_requests(&self) -> &RequestChain {
        &self.transform_requests
    }

    pub fn transform_responses(&self) -> &ResponseChain {
        &self.transform_responses
    }

    /// Builder view over this client's defaults.
    pub fn builder(&self) -> RequestBuilder<'_> {
        RequestBuilder {
            base_url: self.base_url.as_deref(),
            default_headers: &self.default_headers,
            validate_status: &self.validate_status,
            transform_requests: &self.transform_requests,
            transform_responses: &self.transform_responses,
        }
    }

    /// Resolve `options` against the client defaults and run the request
    /// transforms, without sending anything.
    pub fn prepare(&self, path: &str, options: RequestOptions) -> Result<PreparedRequest, Error> {
        self.builder().build(path, options)
    }
}

impl<T: Transport> Client<T> {
    /// Send one request and interpret its response.
    ///
    /// The transport is called exactly once. Transport failures come back as
    /// `Error::Transport`; a response failing validate-status comes back as
    /// `Error::Status` carrying the full envelope.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        let prepared = self.prepare(path, options)?;
        let response = self.dispatch(&prepared).await?;
        prepared.finish(response)
    }

    async fn dispatch(&self, prepared: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        let request = prepared.request();
        let url = prepared.url();
        debug!(method = %request.method, url, "dispatching request");

        let response = match &request.signal {
            Some(signal) if signal.is_cancelled() => {
                warn!(method = %request.method, url, "request aborted before dispatch");
                return Err(TransportError::Aborted);
            }
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => {
                        warn!(method = %request.method, url, "request aborted in flight");
                        return Err(TransportError::Aborted);
                    }
                    result = self.transport.send(url, request) => result?,
                }
            }
            None => self.transport.send(url, request).await?,
        };

        debug!(status = response.status, url, "received response");
        Ok(response)
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        self.request(path, options.method(HttpMethod::Get)).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        self.request(path, options.method(HttpMethod::Post)).await
    }

    pub async fn patch(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        self.request(path, options.method(HttpMethod::Patch)).await
    }

    pub async fn put(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        self.request(path, options.method(HttpMethod::Put)).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        self.request(path, options.method(HttpMethod::Delete)).await
    }

    pub async fn options(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        self.request(path, options.method(HttpMethod::Options)).await
    }

    pub async fn head(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope, Error> {
        self.request(path, options.method(HttpMethod::Head)).await
    }
}

impl<T: fmt::Debug> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("transform_requests", &self.transform_requests)
            .field("transform_responses", &self.transform_responses)
            .finish_non_exhaustive()
    }
}
