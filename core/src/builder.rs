//! Per-request options and the builder that resolves them against a client.
//!
//! # Design
//! Building a request is synchronous and free of I/O. `RequestBuilder`
//! borrows the client's defaults, merges them with one `RequestOptions`, runs
//! the request transforms and yields a `PreparedRequest`. The prepared request
//! keeps everything needed to interpret the transport's answer, so turning a
//! raw `HttpResponse` into an envelope is also a plain function call.
//!
//! Merge rules: a per-call validate-status predicate replaces the client's;
//! per-call transforms are appended to the client's chains; headers are the
//! global layer, then the method layer, then the call's own headers, all
//! appended.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{DefaultHeaders, ValidateStatus};
use crate::error::{BoxError, Error, RequestError};
use crate::http::{
    build_url, CacheMode, Credentials, Headers, HttpMethod, HttpRequest, HttpResponse,
    ParamValue, RedirectMode, ReferrerPolicy, RequestMode,
};
use crate::payload::Payload;
use crate::response::ResponseEnvelope;
use crate::transform::{RequestChain, RequestTransform, ResponseChain, ResponseTransform};

/// Options describing a single request.
///
/// `RequestOptions::default()` is a bare GET.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Headers,
    pub body: Payload,
    pub params: Vec<(String, ParamValue)>,
    pub mode: Option<RequestMode>,
    pub credentials: Option<Credentials>,
    pub cache: Option<CacheMode>,
    pub redirect: Option<RedirectMode>,
    pub referrer: Option<String>,
    pub referrer_policy: Option<ReferrerPolicy>,
    pub integrity: Option<String>,
    pub keepalive: Option<bool>,
    pub signal: Option<CancellationToken>,
    pub validate_status: Option<ValidateStatus>,
    pub transform_requests: Vec<RequestTransform>,
    pub transform_responses: Vec<ResponseTransform>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Append a header; earlier values of the same name are kept.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the body. The default request transform will turn
    /// structured values into a JSON string.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Payload::json(value)?;
        Ok(self)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn redirect(mut self, redirect: RedirectMode) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn referrer_policy(mut self, policy: ReferrerPolicy) -> Self {
        self.referrer_policy = Some(policy);
        self
    }

    pub fn integrity(mut self, integrity: impl Into<String>) -> Self {
        self.integrity = Some(integrity.into());
        self
    }

    pub fn keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = Some(keepalive);
        self
    }

    /// Abort the request when `signal` is cancelled.
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn validate_status<F>(mut self, validate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.validate_status = Some(Arc::new(validate));
        self
    }

    /// Run `transform` after the client's request transforms.
    pub fn transform_request<F>(mut self, transform: F) -> Self
    where
        F: Fn(Payload, &mut Headers) -> Result<Payload, BoxError> + Send + Sync + 'static,
    {
        self.transform_requests.push(Arc::new(transform));
        self
    }

    /// Run `transform` after the client's response transforms.
    pub fn transform_response<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.transform_responses.push(Arc::new(transform));
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("params", &self.params)
            .field("signal", &self.signal.is_some())
            .field("validate_status", &self.validate_status.is_some())
            .field("transform_requests", &self.transform_requests.len())
            .field("transform_responses", &self.transform_responses.len())
            .finish_non_exhaustive()
    }
}

/// Settings in force for one request after merging client and call levels.
#[derive(Clone)]
pub struct EffectiveConfig {
    pub validate_status: ValidateStatus,
    pub transform_requests: RequestChain,
    pub transform_responses: ResponseChain,
    pub headers: Headers,
}

impl fmt::Debug for EffectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveConfig")
            .field("transform_requests", &self.transform_requests)
            .field("transform_responses", &self.transform_responses)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Borrowed view of a client's defaults that resolves and builds requests.
#[derive(Clone, Copy)]
pub struct RequestBuilder<'a> {
    pub base_url: Option<&'a str>,
    pub default_headers: &'a DefaultHeaders,
    pub validate_status: &'a ValidateStatus,
    pub transform_requests: &'a RequestChain,
    pub transform_responses: &'a ResponseChain,
}

impl RequestBuilder<'_> {
    /// Merge the client defaults with `options`.
    pub fn resolve(&self, options: &RequestOptions) -> EffectiveConfig {
        let validate_status = options
            .validate_status
            .clone()
            .unwrap_or_else(|| Arc::clone(self.validate_status));

        let headers = Headers::merge([
            &self.default_headers.global,
            self.default_headers.for_method(options.method),
            &options.headers,
        ]);

        EffectiveConfig {
            validate_status,
            transform_requests: self
                .transform_requests
                .extend(options.transform_requests.iter().cloned()),
            transform_responses: self
                .transform_responses
                .extend(options.transform_responses.iter().cloned()),
            headers,
        }
    }

    /// Resolve `options`, run the request transforms and assemble the
    /// descriptor sent to the transport.
    pub fn build(&self, path: &str, options: RequestOptions) -> Result<PreparedRequest, Error> {
        let EffectiveConfig {
            validate_status,
            transform_requests,
            transform_responses,
            mut headers,
        } = self.resolve(&options);

        let body = transform_requests.run(options.body, &mut headers)?;
        let url = build_url(self.base_url, path, &options.params);

        let request = HttpRequest {
            method: options.method,
            headers,
            body,
            mode: options.mode,
            credentials: options.credentials,
            cache: options.cache,
            redirect: options.redirect,
            referrer: options.referrer,
            referrer_policy: options.referrer_policy,
            integrity: options.integrity,
            keepalive: options.keepalive,
            signal: options.signal,
        };

        Ok(PreparedRequest {
            url,
            request,
            validate_status,
            transform_responses,
        })
    }
}

/// A request ready for the transport, plus what is needed to judge its
/// response.
pub struct PreparedRequest {
    url: String,
    request: HttpRequest,
    validate_status: ValidateStatus,
    transform_responses: ResponseChain,
}

impl PreparedRequest {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Run the response transforms over `response` and apply validate-status.
    ///
    /// Returns the envelope on success, `Error::Status` wrapping the same
    /// envelope when validation fails, or `Error::Transform` if a response
    /// transform fails (in which case no envelope exists).
    pub fn finish(self, response: HttpResponse) -> Result<ResponseEnvelope, Error> {
        let data = self.transform_responses.run(Value::String(response.body))?;

        let envelope = ResponseEnvelope {
            url: self.url,
            config: self.request,
            headers: response.headers,
            redirected: response.redirected,
            status: response.status,
            status_text: response.status_text,
            data,
        };

        if (self.validate_status)(envelope.status) {
            Ok(envelope)
        } else {
            tracing::warn!(status = envelope.status, url = %envelope.url, "request rejected by status validation");
            Err(RequestError::new(envelope).into())
        }
    }
}

impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("url", &self.url)
            .field("request", &self.request)
            .field("transform_responses", &self.transform_responses)
            .finish_non_exhaustive()
    }
}
