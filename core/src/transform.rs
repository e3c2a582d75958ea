//! Ordered request and response transform chains.
//!
//! # Design
//! A chain is an `Arc<[T]>`: cloning it is a pointer copy, and extending it
//! builds a new slice instead of touching the old one. A client's chain can
//! therefore serve as the base of any number of per-request chains without
//! one request ever seeing another's extra steps.
//!
//! Request transforms see the outgoing headers as well as the body, because
//! encoding a body usually means declaring its content type.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{BoxError, TransformError, TransformStage};
use crate::http::{Headers, APPLICATION_JSON, CONTENT_TYPE};
use crate::payload::{self, Payload};

pub type RequestTransform =
    Arc<dyn Fn(Payload, &mut Headers) -> Result<Payload, BoxError> + Send + Sync>;

pub type ResponseTransform = Arc<dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync>;

pub type RequestChain = TransformChain<RequestTransform>;
pub type ResponseChain = TransformChain<ResponseTransform>;

/// Immutable, cheaply clonable list of transform steps.
pub struct TransformChain<T> {
    steps: Arc<[T]>,
}

impl<T: Clone> TransformChain<T> {
    pub fn new() -> Self {
        Self {
            steps: Arc::from(Vec::new()),
        }
    }

    pub fn from_steps(steps: Vec<T>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// New chain made of this chain's steps followed by `extra`.
    pub fn extend<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut steps = self.steps.to_vec();
        steps.extend(extra);
        Self::from_steps(steps)
    }

    /// New chain made of this chain's steps followed by `other`'s.
    pub fn extend_with(&self, other: &TransformChain<T>) -> Self {
        self.extend(other.steps.iter().cloned())
    }

    /// Append a step to this chain.
    ///
    /// Chains cloned from this one earlier keep their old steps.
    pub fn push_step(&mut self, step: T) {
        *self = self.extend([step]);
    }

    pub fn steps(&self) -> &[T] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<T> Clone for TransformChain<T> {
    fn clone(&self) -> Self {
        Self {
            steps: Arc::clone(&self.steps),
        }
    }
}

impl<T: Clone> Default for TransformChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TransformChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl TransformChain<RequestTransform> {
    /// Chain holding only `default_request_transform`.
    pub fn with_default() -> Self {
        Self::from_steps(vec![Arc::new(default_request_transform) as RequestTransform])
    }

    pub fn push<F>(&mut self, transform: F)
    where
        F: Fn(Payload, &mut Headers) -> Result<Payload, BoxError> + Send + Sync + 'static,
    {
        self.push_step(Arc::new(transform));
    }

    /// New chain with `transform` appended; `self` is left as it was.
    pub fn then<F>(&self, transform: F) -> Self
    where
        F: Fn(Payload, &mut Headers) -> Result<Payload, BoxError> + Send + Sync + 'static,
    {
        self.extend([Arc::new(transform) as RequestTransform])
    }

    /// Run every step in order, threading the body through.
    pub fn run(&self, mut data: Payload, headers: &mut Headers) -> Result<Payload, TransformError> {
        for (index, step) in self.steps.iter().enumerate() {
            data = step(data, &mut *headers).map_err(|source| TransformError {
                stage: TransformStage::Request,
                index,
                source,
            })?;
        }
        Ok(data)
    }
}

impl TransformChain<ResponseTransform> {
    /// Chain holding only `default_response_transform`.
    pub fn with_default() -> Self {
        Self::from_steps(vec![Arc::new(default_response_transform) as ResponseTransform])
    }

    pub fn push<F>(&mut self, transform: F)
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.push_step(Arc::new(transform));
    }

    /// New chain with `transform` appended; `self` is left as it was.
    pub fn then<F>(&self, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.extend([Arc::new(transform) as ResponseTransform])
    }

    pub fn run(&self, mut data: Value) -> Result<Value, TransformError> {
        for (index, step) in self.steps.iter().enumerate() {
            data = step(data).map_err(|source| TransformError {
                stage: TransformStage::Response,
                index,
                source,
            })?;
        }
        Ok(data)
    }
}

/// JSON-encode structured bodies and declare them as `application/json`.
///
/// Anything `payload::is_object` rejects passes through with the headers
/// untouched.
pub fn default_request_transform(data: Payload, headers: &mut Headers) -> Result<Payload, BoxError> {
    if !payload::is_object(&data) {
        return Ok(data);
    }
    match data {
        Payload::Json(value) => {
            let encoded = serde_json::to_string(&value)?;
            headers.set(CONTENT_TYPE, APPLICATION_JSON);
            Ok(Payload::Json(Value::String(encoded)))
        }
        other => Ok(other),
    }
}

/// Parse string data as JSON, falling back to the string when it is not JSON.
pub fn default_response_transform(data: Value) -> Result<Value, BoxError> {
    let Value::String(text) = data else {
        return Ok(data);
    };
    match serde_json::from_str(&text) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            tracing::debug!(error = %err, "response body is not JSON, keeping text");
            Ok(Value::String(text))
        }
    }
}
