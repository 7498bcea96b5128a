//! Response types

use crate::error::{Error, RequestFailure};
use crate::request::HttpRequest;

/// Result type of the throwing calling conventions
///
/// The error side carries the classified error together with the metadata.
pub type Response<R, E = RequestFailure> = Result<R, E>;

/// Status line and headers of a received response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// HTTP status code
    pub status: u16,
    /// Response headers in the order received
    pub headers: Vec<(String, String)>,
    /// Final URL, after redirects
    pub url: String,
}

impl ResponseHead {
    /// Create a head with a status and no headers
    pub fn new(status: u16, url: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            url: url.into(),
        }
    }

    /// Look up a header value, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Everything known about one request at the point its outcome was decided
///
/// `request` is set once the URL and body are materialized, `response` and
/// `data` only after the transport delivered something, so failures may carry
/// a partial value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// The request actually handed to the transport
    pub request: Option<HttpRequest>,
    /// The response head, if one was received
    pub response: Option<ResponseHead>,
    /// The raw body, if one was received
    pub data: Option<Vec<u8>>,
}

impl ResponseMetadata {
    /// Status of the received response
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|head| head.status)
    }
}

/// Result of one request paired with its metadata
#[derive(Debug)]
pub struct Outcome<T> {
    /// Decoded value or classified error
    pub result: Result<T, Error>,
    /// Metadata gathered during the request
    pub metadata: ResponseMetadata,
}

impl<T> Outcome<T> {
    /// Successful outcome
    pub fn success(value: T, metadata: ResponseMetadata) -> Self {
        Self {
            result: Ok(value),
            metadata,
        }
    }

    /// Failed outcome
    pub fn failure(error: impl Into<Error>, metadata: ResponseMetadata) -> Self {
        Self {
            result: Err(error.into()),
            metadata,
        }
    }

    /// Transform the success value, keeping the metadata
    pub fn and_then<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Result<U, Error>,
    {
        Outcome {
            result: self.result.and_then(f),
            metadata: self.metadata,
        }
    }

    /// Replace the whole result, keeping the metadata
    pub fn map_result<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(Result<T, Error>) -> Result<U, Error>,
    {
        Outcome {
            result: f(self.result),
            metadata: self.metadata,
        }
    }

    /// Split into the result and the metadata
    pub fn into_parts(self) -> (Result<T, Error>, ResponseMetadata) {
        (self.result, self.metadata)
    }

    /// Bundle a failure with the metadata, dropping the metadata on success
    pub fn into_result(self) -> Response<T> {
        let metadata = self.metadata;
        self.result
            .map_err(|error| RequestFailure::new(error, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn test_response_type_is_result() {
        let success: Response<i32> = Ok(42);
        assert!(matches!(success, Ok(42)));

        let error: Response<i32> = Err(RequestFailure::new(
            NetworkError::NoResponse.into(),
            ResponseMetadata::default(),
        ));
        assert!(error.is_err());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut head = ResponseHead::new(200, "http://localhost/");
        head.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        assert_eq!(head.header("content-type"), Some("application/json"));
        assert_eq!(head.header("x-missing"), None);
        assert!(head.is_success());
    }

    #[test]
    fn test_and_then_keeps_metadata() {
        let metadata = ResponseMetadata {
            data: Some(b"7".to_vec()),
            ..Default::default()
        };
        let outcome = Outcome::success(b"7".to_vec(), metadata.clone())
            .and_then(|bytes| Ok(bytes.len()));
        assert_eq!(outcome.metadata, metadata);
        assert!(matches!(outcome.result, Ok(1)));
    }

    #[test]
    fn test_into_result_bundles_metadata() {
        let metadata = ResponseMetadata {
            response: Some(ResponseHead::new(503, "http://localhost/")),
            ..Default::default()
        };
        let outcome: Outcome<()> =
            Outcome::failure(NetworkError::InvalidStatusCode(503), metadata);
        let failure = outcome.into_result().expect_err("Should fail");
        assert_eq!(failure.metadata.status(), Some(503));
        assert_eq!(failure.error.status_code(), Some(503));
    }
}
