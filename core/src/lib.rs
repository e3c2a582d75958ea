//! Configurable async HTTP client core.
//!
//! # Overview
//! A `Client` merges its defaults with per-request options, runs ordered
//! transforms over the outgoing body, hands the resolved request to a
//! `Transport`, runs transforms over the response body and decides success
//! with a validate-status predicate. Callers get a `ResponseEnvelope` or an
//! `Error`, never a partially built response.
//!
//! # Design
//! - The network is behind the `Transport` trait; the core never does I/O.
//! - Building (`Client::prepare`) and interpreting (`PreparedRequest::finish`)
//!   are plain synchronous steps, usable without a transport.
//! - Header layers merge by appending, so repeated names survive.
//! - Transform chains are shared immutable slices; per-request extension
//!   never touches the client's chain.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod payload;
pub mod response;
pub mod transform;
pub mod transport;

pub use builder::{EffectiveConfig, PreparedRequest, RequestBuilder, RequestOptions};
pub use client::Client;
pub use config::{default_validate_status, ClientConfig, DefaultHeaders, ValidateStatus};
pub use error::{BoxError, Error, RequestError, Result, TransformError, TransformStage, TransportError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, ParamValue};
pub use payload::{FormData, Payload};
pub use response::ResponseEnvelope;
pub use transform::{
    default_request_transform, default_response_transform, RequestChain, ResponseChain,
    TransformChain,
};
pub use transport::Transport;

pub use tokio_util::sync::CancellationToken;
