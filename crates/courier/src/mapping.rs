//! Structured mapping from generic JSON values
//!
//! Two construction conventions are supported:
//!
//! - [`Mappable`]: the value is created with [`Default`] and then filled field
//!   by field. Missing or mistyped fields keep their default.
//! - [`ImmutableMappable`]: the value is constructed in one step from a
//!   [`Map`] and construction may fail.
//!
//! The convention is picked by the decoder used ([`object`] or
//! [`immutable_object`]), so it is resolved at compile time. Every failure is
//! reported as [`NetworkError::DeserializationFailure`]. Arrays are
//! all-or-nothing under both conventions: a single element that is not an
//! object, or that fails to construct, fails the whole array.
//!
//! ```
//! use courier::mapping::{ImmutableMappable, Map, MapError, Mappable};
//!
//! #[derive(Default)]
//! struct Profile {
//!     name: String,
//!     city: Option<String>,
//! }
//!
//! impl Mappable for Profile {
//!     fn mapping(&mut self, map: &Map<'_>) {
//!         map.fill("name", &mut self.name);
//!         self.city = map.optional("address.city");
//!     }
//! }
//!
//! struct Id(u64);
//!
//! impl ImmutableMappable for Id {
//!     fn from_map(map: &Map<'_>) -> Result<Self, MapError> {
//!         Ok(Id(map.value("id")?))
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::{Error, NetworkError};
use crate::response::Outcome;

/// Errors raised while reading a [`Map`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The key path does not exist
    #[error("Missing key: {0}")]
    MissingKey(String),
    /// The value exists but has the wrong shape
    #[error("Invalid value for key {key}: {reason}")]
    InvalidValue {
        /// Key path
        key: String,
        /// Decoder message
        reason: String,
    },
    /// The JSON value is not an object
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),
    /// The JSON value is not an array
    #[error("Expected a JSON array, found {0}")]
    NotAnArray(&'static str),
    /// Custom construction failure
    #[error("{0}")]
    Custom(String),
}

impl From<MapError> for NetworkError {
    fn from(err: MapError) -> Self {
        NetworkError::DeserializationFailure(err.to_string())
    }
}

impl From<MapError> for Error {
    fn from(err: MapError) -> Self {
        Error::Network(err.into())
    }
}

/// Read-only view over a JSON object
///
/// Keys may be dotted paths (`"address.city"`) to reach nested objects. A
/// key that itself contains `.` is not reachable through a path; use
/// [`Map::literal`] for it.
#[derive(Debug, Clone, Copy)]
pub struct Map<'a> {
    object: &'a serde_json::Map<String, Value>,
}

impl<'a> Map<'a> {
    /// Wrap a JSON value, which must be an object
    pub fn new(value: &'a Value) -> Result<Self, MapError> {
        match value {
            Value::Object(object) => Ok(Self { object }),
            other => Err(MapError::NotAnObject(kind(other))),
        }
    }

    /// The raw value at a key path
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.object.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// The raw value stored under `key` exactly, without path splitting
    pub fn literal(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key)
    }

    /// Whether the key path exists
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Required value at a key path
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Result<T, MapError> {
        let value = self
            .get(key)
            .ok_or_else(|| MapError::MissingKey(key.to_string()))?;
        T::deserialize(value).map_err(|err| MapError::InvalidValue {
            key: key.to_string(),
            reason: err.to_string(),
        })
    }

    /// Value at a key path, `None` when absent or mistyped
    pub fn optional<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| T::deserialize(value).ok())
    }

    /// Overwrite `field` when the key path holds a compatible value
    ///
    /// Returns whether the field was written.
    pub fn fill<T: DeserializeOwned>(&self, key: &str, field: &mut T) -> bool {
        match self.optional(key) {
            Some(value) => {
                *field = value;
                true
            }
            None => false,
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Mutable convention: default-construct, then fill
pub trait Mappable: Default {
    /// Copy fields out of the map
    fn mapping(&mut self, map: &Map<'_>);
}

/// Immutable convention: construct atomically or fail
pub trait ImmutableMappable: Sized {
    /// Build the value from the map
    fn from_map(map: &Map<'_>) -> Result<Self, MapError>;
}

/// Build a [`Mappable`] from a JSON value
pub fn map_mappable<T: Mappable>(value: &Value) -> Result<T, MapError> {
    let map = Map::new(value)?;
    let mut target = T::default();
    target.mapping(&map);
    Ok(target)
}

/// Build an [`ImmutableMappable`] from a JSON value
pub fn map_immutable<T: ImmutableMappable>(value: &Value) -> Result<T, MapError> {
    T::from_map(&Map::new(value)?)
}

fn map_array<T, F>(value: &Value, map_one: F) -> Result<Vec<T>, MapError>
where
    F: Fn(&Value) -> Result<T, MapError>,
{
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                map_one(item)
                    .map_err(|err| MapError::Custom(format!("element {index}: {err}")))
            })
            .collect(),
        other => Err(MapError::NotAnArray(kind(other))),
    }
}

fn parse(bytes: &[u8]) -> Result<Value, Error> {
    serde_json::from_slice(bytes).map_err(|err| {
        tracing::warn!("Response body is not valid JSON: {}", err);
        NetworkError::DeserializationFailure(err.to_string()).into()
    })
}

fn log_failure(err: MapError) -> Error {
    tracing::warn!("Could not map response body: {}", err);
    err.into()
}

/// Decode a [`Mappable`] object
pub fn object<T: Mappable>(outcome: Outcome<Vec<u8>>) -> Outcome<T> {
    outcome.and_then(|bytes| map_mappable(&parse(&bytes)?).map_err(log_failure))
}

/// Decode an array of [`Mappable`] objects
pub fn object_array<T: Mappable>(outcome: Outcome<Vec<u8>>) -> Outcome<Vec<T>> {
    outcome.and_then(|bytes| {
        map_array(&parse(&bytes)?, map_mappable).map_err(log_failure)
    })
}

/// Decode an [`ImmutableMappable`] object
pub fn immutable_object<T: ImmutableMappable>(outcome: Outcome<Vec<u8>>) -> Outcome<T> {
    outcome.and_then(|bytes| map_immutable(&parse(&bytes)?).map_err(log_failure))
}

/// Decode an array of [`ImmutableMappable`] objects
pub fn immutable_object_array<T: ImmutableMappable>(
    outcome: Outcome<Vec<u8>>,
) -> Outcome<Vec<T>> {
    outcome.and_then(|bytes| {
        map_array(&parse(&bytes)?, map_immutable).map_err(log_failure)
    })
}
