//! Error types for the courier client.
//!
//! # Design
//! Three failure classes reach the caller and each keeps its own variant:
//! a response that fails the validate-status predicate (`Status`, which still
//! carries the whole envelope), a transport that could not produce a response
//! at all (`Transport`), and a transform step that returned an error
//! (`Transform`). Transport errors are stored as-is so callers can downcast to
//! whatever their transport returns.

use std::fmt;

use crate::response::ResponseEnvelope;

/// Error type produced by transforms and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by `Client` requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The response arrived but its status failed validation.
    #[error(transparent)]
    Status(#[from] RequestError),

    /// The transport failed before a response was available.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request or response transform step failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl Error {
    /// Envelope of a rejected response, if this is a status failure.
    pub fn response(&self) -> Option<&ResponseEnvelope> {
        match self {
            Error::Status(err) => Some(&err.response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|response| response.status)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Aborted))
    }
}

/// A response whose status failed the validate-status predicate.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
    pub response: Box<ResponseEnvelope>,
}

impl RequestError {
    pub fn new(response: ResponseEnvelope) -> Self {
        Self {
            message: format!("The request failed with status {}.", response.status),
            response: Box::new(response),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request's cancellation signal fired.
    #[error("request aborted")]
    Aborted,

    /// Error raised by the transport itself, kept unchanged.
    #[error(transparent)]
    Failed(BoxError),
}

impl TransportError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        TransportError::Failed(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStage {
    Request,
    Response,
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformStage::Request => f.write_str("request"),
            TransformStage::Response => f.write_str("response"),
        }
    }
}

/// A transform step returned an error; the pipeline stopped at `index`.
#[derive(Debug, thiserror::Error)]
#[error("{stage} transform #{index} failed: {source}")]
pub struct TransformError {
    pub stage: TransformStage,
    pub index: usize,
    #[source]
    pub source: BoxError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    use crate::http::HttpRequest;

    fn envelope(status: u16) -> ResponseEnvelope {
        ResponseEnvelope {
            url: "https://api.test/items".to_string(),
            config: HttpRequest::default(),
            headers: Default::default(),
            redirected: false,
            status,
            status_text: "Not Found".to_string(),
            data: serde_json::Value::Null,
        }
    }

    #[test]
    fn request_error_message_names_status() {
        let err = RequestError::new(envelope(404));
        assert_eq!(err.to_string(), "The request failed with status 404.");
        assert_eq!(err.response.status, 404);
    }

    #[test]
    fn status_error_exposes_response() {
        let err = Error::from(RequestError::new(envelope(500)));
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_aborted());
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::from(TransportError::new(io));
        assert_eq!(err.to_string(), "refused");
        assert!(err.response().is_none());

        let Error::Transport(TransportError::Failed(inner)) = err else {
            panic!("expected transport failure");
        };
        let io = inner.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn transform_error_display_names_stage_and_step() {
        let err = TransformError {
            stage: TransformStage::Response,
            index: 1,
            source: "bad payload".into(),
        };
        assert_eq!(err.to_string(), "response transform #1 failed: bad payload");
        assert!(err.source().is_some());
    }

    #[test]
    fn aborted_is_detected() {
        assert!(Error::from(TransportError::Aborted).is_aborted());
    }
}
