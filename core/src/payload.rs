//! Request payloads and the shape predicates used by the default transforms.
//!
//! # Design
//! A body travelling through the request transform chain is one of three
//! things: nothing at all, a JSON value (which also covers plain strings,
//! numbers and booleans), or a multipart form. The predicates below classify a
//! `Payload` the same way the default request transform needs to: only
//! structured JSON values are worth encoding, everything else is handed to the
//! transport untouched.

use serde::Serialize;
use serde_json::Value;

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// Any JSON value, including bare strings and numbers.
    Json(Value),
    /// A multipart form payload. Encoding is left to the transport.
    Form(FormData),
}

impl Payload {
    /// Serialize `value` into a payload. A value serializing to `null`
    /// becomes `Empty`.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Payload::from)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Text form of the body as it would go on the wire.
    ///
    /// Strings are returned verbatim, other JSON values in their compact JSON
    /// form. `Empty`, `Form` and JSON `null` have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Payload::Empty | Payload::Form(_) | Payload::Json(Value::Null) => None,
            Payload::Json(Value::String(s)) => Some(s.clone()),
            Payload::Json(other) => Some(other.to_string()),
        }
    }
}

/// `null` means "no body".
impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Empty,
            value => Payload::Json(value),
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Json(Value::String(value.to_string()))
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Json(Value::String(value))
    }
}

impl From<FormData> for Payload {
    fn from(form: FormData) -> Self {
        Payload::Form(form)
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        filename: String,
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

/// Ordered multipart form payload. Field names may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Add a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                filename: filename.into(),
                content_type,
                data,
            },
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// True for structured JSON values: objects and arrays.
///
/// Form payloads are excluded even though they are structured, since they
/// must reach the transport as-is.
pub fn is_object(payload: &Payload) -> bool {
    matches!(payload, Payload::Json(Value::Object(_) | Value::Array(_)))
}

pub fn is_array(payload: &Payload) -> bool {
    matches!(payload, Payload::Json(Value::Array(_)))
}

pub fn is_string(payload: &Payload) -> bool {
    matches!(payload, Payload::Json(Value::String(_)))
}

pub fn is_number(payload: &Payload) -> bool {
    matches!(payload, Payload::Json(Value::Number(_)))
}

pub fn is_boolean(payload: &Payload) -> bool {
    matches!(payload, Payload::Json(Value::Bool(_)))
}

pub fn is_form_data(payload: &Payload) -> bool {
    matches!(payload, Payload::Form(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_and_arrays_are_structured() {
        assert!(is_object(&Payload::Json(json!({"a": 1}))));
        assert!(is_object(&Payload::Json(json!([1, 2]))));
        assert!(is_array(&Payload::Json(json!([]))));
        assert!(!is_array(&Payload::Json(json!({}))));
    }

    #[test]
    fn primitives_are_not_objects() {
        for payload in [
            Payload::Empty,
            Payload::Json(Value::Null),
            Payload::from("text"),
            Payload::Json(json!(3)),
            Payload::Json(json!(false)),
            Payload::Form(FormData::new().text("a", "b")),
        ] {
            assert!(!is_object(&payload), "{payload:?}");
        }
    }

    #[test]
    fn primitive_predicates_match_only_their_type() {
        let s = Payload::from("x");
        let n = Payload::Json(json!(1.5));
        let b = Payload::Json(json!(true));
        assert!(is_string(&s) && !is_number(&s) && !is_boolean(&s));
        assert!(is_number(&n) && !is_string(&n) && !is_boolean(&n));
        assert!(is_boolean(&b) && !is_string(&b) && !is_number(&b));
        assert!(!is_string(&Payload::Empty));
        assert!(!is_number(&Payload::Json(Value::Null)));
    }

    #[test]
    fn form_data_predicate() {
        let form = FormData::new()
            .text("name", "value")
            .file("upload", "a.txt", Some("text/plain".to_string()), b"hi".to_vec());
        assert_eq!(form.len(), 2);
        assert!(is_form_data(&Payload::from(form)));
        assert!(!is_form_data(&Payload::Json(json!({}))));
    }

    #[test]
    fn to_text_keeps_strings_verbatim() {
        assert_eq!(Payload::from("plain").to_text().as_deref(), Some("plain"));
        assert_eq!(Payload::Json(json!(42)).to_text().as_deref(), Some("42"));
        assert_eq!(Payload::Empty.to_text(), None);
        assert_eq!(Payload::Form(FormData::new()).to_text(), None);
    }

    #[test]
    fn null_is_no_body() {
        assert_eq!(Payload::from(Value::Null), Payload::Empty);
        assert_eq!(Payload::json(&Option::<u32>::None).unwrap(), Payload::Empty);
        assert_eq!(Payload::Json(Value::Null).to_text(), None);
        assert_eq!(Payload::from(json!(0)), Payload::Json(json!(0)));
    }

    #[test]
    fn json_constructor_serializes_value() {
        #[derive(Serialize)]
        struct Item {
            x: u32,
        }
        let payload = Payload::json(&Item { x: 1 }).unwrap();
        assert_eq!(payload, Payload::Json(json!({"x": 1})));
    }
}
