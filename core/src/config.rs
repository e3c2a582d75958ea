//! Client-level configuration.
//!
//! # Design
//! `ClientConfig` is plain data with a `Default` impl and builder-style
//! setters. Every field is optional: an unset validate-status predicate or
//! transform chain falls back to the built-in default when the client is
//! constructed. Configuring a transform chain replaces the default step rather
//! than adding to it; include `default_request_transform` or
//! `default_response_transform` explicitly to keep it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;
use crate::http::{Headers, HttpMethod, ACCEPT, APPLICATION_JSON, CONTENT_TYPE};
use crate::payload::Payload;
use crate::transform::{RequestChain, ResponseChain};

/// Predicate deciding whether a status code counts as success.
pub type ValidateStatus = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// Accepts exactly the 2xx range.
pub fn default_validate_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Header layers applied to every request: one global layer, then one layer
/// per method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultHeaders {
    pub global: Headers,
    pub get: Headers,
    pub post: Headers,
    pub patch: Headers,
    pub put: Headers,
    pub delete: Headers,
    pub options: Headers,
    pub head: Headers,
}

impl DefaultHeaders {
    /// No default headers at all.
    pub fn empty() -> Self {
        Self {
            global: Headers::new(),
            get: Headers::new(),
            post: Headers::new(),
            patch: Headers::new(),
            put: Headers::new(),
            delete: Headers::new(),
            options: Headers::new(),
            head: Headers::new(),
        }
    }

    pub fn for_method(&self, method: HttpMethod) -> &Headers {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Patch => &self.patch,
            HttpMethod::Put => &self.put,
            HttpMethod::Delete => &self.delete,
            HttpMethod::Options => &self.options,
            HttpMethod::Head => &self.head,
        }
    }

    pub fn for_method_mut(&mut self, method: HttpMethod) -> &mut Headers {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }
}

impl Default for DefaultHeaders {
    /// JSON-friendly `Accept` everywhere, JSON `Content-Type` on methods that
    /// usually carry a body.
    fn default() -> Self {
        let json_body = Headers::from([(CONTENT_TYPE, APPLICATION_JSON)]);
        Self {
            global: Headers::from([(ACCEPT, "application/json, text/plain, */*")]),
            post: json_body.clone(),
            patch: json_body.clone(),
            put: json_body,
            ..Self::empty()
        }
    }
}

/// Construction-time settings for a `Client`.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub default_headers: DefaultHeaders,
    pub validate_status: Option<ValidateStatus>,
    pub transform_requests: Option<RequestChain>,
    pub transform_responses: Option<ResponseChain>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn default_headers(mut self, headers: DefaultHeaders) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn validate_status<F>(mut self, validate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.validate_status = Some(Arc::new(validate));
        self
    }

    /// Add a request transform to the configured chain.
    pub fn transform_request<F>(mut self, transform: F) -> Self
    where
        F: Fn(Payload, &mut Headers) -> Result<Payload, BoxError> + Send + Sync + 'static,
    {
        self.transform_requests
            .get_or_insert_with(RequestChain::new)
            .push(transform);
        self
    }

    /// Add a response transform to the configured chain.
    pub fn transform_response<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.transform_responses
            .get_or_insert_with(ResponseChain::new)
            .push(transform);
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("validate_status", &self.validate_status.is_some())
            .field("transform_requests", &self.transform_requests)
            .field("transform_responses", &self.transform_responses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validate_status_is_2xx() {
        for status in 0..=999u16 {
            assert_eq!(
                default_validate_status(status),
                (200..300).contains(&status),
                "status {status}"
            );
        }
        assert!(default_validate_status(200));
        assert!(default_validate_status(299));
        assert!(!default_validate_status(199));
        assert!(!default_validate_status(300));
    }

    #[test]
    fn default_headers_declare_json() {
        let headers = DefaultHeaders::default();
        assert_eq!(headers.global.get(ACCEPT), Some("application/json, text/plain, */*"));
        for method in [HttpMethod::Post, HttpMethod::Patch, HttpMethod::Put] {
            assert_eq!(headers.for_method(method).get(CONTENT_TYPE), Some(APPLICATION_JSON));
        }
        for method in [HttpMethod::Get, HttpMethod::Delete, HttpMethod::Options, HttpMethod::Head] {
            assert!(headers.for_method(method).is_empty());
        }
    }

    #[test]
    fn empty_default_headers_have_no_layers() {
        let headers = DefaultHeaders::empty();
        assert!(headers.global.is_empty());
        assert!(HttpMethod::ALL.iter().all(|m| headers.for_method(*m).is_empty()));
    }

    #[test]
    fn for_method_mut_edits_the_right_layer() {
        let mut headers = DefaultHeaders::empty();
        headers.for_method_mut(HttpMethod::Delete).append("X-Confirm", "yes");
        assert_eq!(headers.delete.get("X-Confirm"), Some("yes"));
        assert!(headers.get.is_empty());
    }

    #[test]
    fn configured_transforms_start_from_empty_chain() {
        let config = ClientConfig::new()
            .transform_request(|data, _headers: &mut Headers| Ok(data))
            .transform_response(|data| Ok(data))
            .transform_response(|data| Ok(data));
        assert_eq!(config.transform_requests.map(|c| c.len()), Some(1));
        assert_eq!(config.transform_responses.map(|c| c.len()), Some(2));
    }
}
