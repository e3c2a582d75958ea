//! The network primitive the client dispatches through.
//!
//! # Design
//! The client never opens a socket itself. A `Transport` receives the final
//! URL and the resolved `HttpRequest`, performs the round trip however it
//! likes, and returns the response with its body read as text. Retries,
//! pooling, TLS and redirects all live on this side of the seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `url` and return the raw response.
    ///
    /// Any status code is a successful send; judging it is the client's job.
    async fn send(&self, url: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, url: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(url, request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, url: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(url, request).await
    }
}
