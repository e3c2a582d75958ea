//! Uniform success shape returned by `Client` requests.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::{Headers, HttpRequest};

/// Result of a request whose status passed validation.
///
/// The same shape is embedded in `RequestError` when validation fails, so a
/// rejected response can be inspected exactly like an accepted one.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// URL the request was sent to, query string included.
    pub url: String,
    /// The descriptor handed to the transport.
    pub config: HttpRequest,
    pub headers: Headers,
    pub redirected: bool,
    pub status: u16,
    pub status_text: String,
    /// Body after the response transform chain.
    pub data: Value,
}

impl ResponseEnvelope {
    /// Deserialize `data` into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
        name: String,
    }

    fn envelope(data: Value) -> ResponseEnvelope {
        ResponseEnvelope {
            url: "https://api.test/items/1".to_string(),
            config: HttpRequest::default(),
            headers: Headers::new(),
            redirected: false,
            status: 200,
            status_text: "OK".to_string(),
            data,
        }
    }

    #[test]
    fn json_deserializes_data() {
        let item: Item = envelope(json!({"id": 1, "name": "first"})).json().unwrap();
        assert_eq!(
            item,
            Item {
                id: 1,
                name: "first".to_string()
            }
        );
    }

    #[test]
    fn json_reports_shape_mismatch() {
        let result: Result<Item, _> = envelope(json!("plain")).json();
        assert!(result.is_err());
    }
}
