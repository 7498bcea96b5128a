//! Error types

use thiserror::Error;

use crate::response::ResponseMetadata;

/// Failures reported by the underlying transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The host could not be reached or the connection dropped
    #[error("Connection error: {0}")]
    Connection(String),
    /// The transport gave up waiting for the server
    #[error("Request timeout")]
    Timeout,
    /// The transport refused to build the request (bad header, bad method, ...)
    #[error("Invalid request: {0}")]
    Request(String),
    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::Request(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Classified request failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Connectivity is known to be absent, the request was not attempted
    #[error("No network connection")]
    NoNetworkConnection,
    /// The transport finished without an error but produced no response
    #[error("No response received")]
    NoResponse,
    /// A path-only URL was used while no base URL is configured
    #[error("Missing base URL")]
    MissingBaseUrl,
    /// The URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The response status is outside the accepted set
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(u16),
    /// Accepted status but the body is empty
    #[error("No data in response")]
    NoData,
    /// Structured mapping could not construct the target type
    #[error("Deserialization failure: {0}")]
    DeserializationFailure(String),
    /// The transport reported an error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl NetworkError {
    /// Status code carried by [`NetworkError::InvalidStatusCode`]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetworkError::InvalidStatusCode(status) => Some(*status),
            _ => None,
        }
    }

    /// Whether this is the empty-body failure that void decoding accepts
    pub fn is_no_data(&self) -> bool {
        matches!(self, NetworkError::NoData)
    }
}

/// Library error
#[derive(Debug, Error)]
pub enum Error {
    /// Classified network failure
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// JSON encoding or decoding error, passed through unchanged
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Form body encoding error
    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
    /// Client build error
    #[error("Client build error: {0}")]
    Build(String),
    /// The task driving a callback or promise did not complete
    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Classified network failure, if any
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self {
            Error::Network(err) => Some(err),
            _ => None,
        }
    }

    /// Status code of an [`NetworkError::InvalidStatusCode`] failure
    pub fn status_code(&self) -> Option<u16> {
        self.as_network().and_then(NetworkError::status_code)
    }

    /// Whether the body was received but could not be turned into the requested shape
    ///
    /// Covers both typed `serde` decoding and structured mapping.
    pub fn is_decoding(&self) -> bool {
        matches!(
            self,
            Error::Json(_) | Error::Network(NetworkError::DeserializationFailure(_))
        )
    }
}

/// Error bundled with the metadata gathered before it happened
///
/// Returned by the promise and async calling conventions so the caller can
/// still inspect the request that was sent and whatever the server answered.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RequestFailure {
    /// The classified error
    #[source]
    pub error: Error,
    /// Metadata gathered up to the failure
    pub metadata: ResponseMetadata,
}

impl RequestFailure {
    /// Bundle an error with its metadata
    pub fn new(error: Error, metadata: ResponseMetadata) -> Self {
        Self { error, metadata }
    }

    /// Classified network failure, if any
    pub fn network_error(&self) -> Option<&NetworkError> {
        self.error.as_network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        assert_eq!(
            NetworkError::NoNetworkConnection.to_string(),
            "No network connection"
        );
        assert_eq!(NetworkError::MissingBaseUrl.to_string(), "Missing base URL");
        assert_eq!(
            NetworkError::InvalidStatusCode(404).to_string(),
            "Invalid status code: 404"
        );
        assert_eq!(NetworkError::NoData.to_string(), "No data in response");
    }

    #[test]
    fn test_transport_error_display() {
        let error = NetworkError::from(TransportError::Connection("refused".to_string()));
        assert_eq!(
            error.to_string(),
            "Transport error: Connection error: refused"
        );
        assert_eq!(TransportError::Timeout.to_string(), "Request timeout");
    }

    #[test]
    fn test_status_code_accessor() {
        let error = Error::from(NetworkError::InvalidStatusCode(500));
        assert_eq!(error.status_code(), Some(500));
        assert_eq!(Error::from(NetworkError::NoData).status_code(), None);
    }

    #[test]
    fn test_network_display_is_transparent() {
        let error = Error::from(NetworkError::NoResponse);
        assert_eq!(error.to_string(), "No response received");
    }

    #[test]
    fn test_is_decoding() {
        let json_error = serde_json::from_str::<u32>("nope").expect_err("Invalid JSON");
        assert!(Error::from(json_error).is_decoding());
        assert!(
            Error::from(NetworkError::DeserializationFailure("missing field".into())).is_decoding()
        );
        assert!(!Error::from(NetworkError::NoData).is_decoding());
    }

    #[test]
    fn test_request_failure_keeps_metadata() {
        let failure = RequestFailure::new(
            NetworkError::InvalidStatusCode(418).into(),
            ResponseMetadata::default(),
        );
        assert_eq!(failure.to_string(), "Invalid status code: 418");
        assert_eq!(
            failure.network_error(),
            Some(&NetworkError::InvalidStatusCode(418))
        );
        assert!(failure.metadata.request.is_none());
    }
}
