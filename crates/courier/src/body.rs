//! Request body encoding

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// `Content-Type` of form bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// `Content-Type` of JSON bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Logical request body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Form parameters, encoded in insertion order
    Form(Vec<(String, String)>),
    /// JSON dictionary
    Json(Map<String, Value>),
    /// Already serialized JSON bytes of an encodable value
    Encodable(Vec<u8>),
}

impl Body {
    /// Serialize any value into an [`Body::Encodable`] body
    pub fn encodable<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Body::Encodable(serde_json::to_vec(value)?))
    }

    /// Raw bytes and the `Content-Type` they must be sent with
    ///
    /// Form values are percent-encoded, so `&` and `=` inside a value cannot
    /// split a pair.
    pub fn encode(&self) -> Result<(Vec<u8>, &'static str), Error> {
        match self {
            Body::Form(params) => Ok((
                serde_urlencoded::to_string(params)?.into_bytes(),
                FORM_CONTENT_TYPE,
            )),
            Body::Json(map) => Ok((serde_json::to_vec(map)?, JSON_CONTENT_TYPE)),
            Body::Encodable(bytes) => Ok((bytes.clone(), JSON_CONTENT_TYPE)),
        }
    }

    /// The `Content-Type` header value for this body
    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Form(_) => FORM_CONTENT_TYPE,
            Body::Json(_) | Body::Encodable(_) => JSON_CONTENT_TYPE,
        }
    }
}
