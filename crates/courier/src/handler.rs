//! Response classification
//!
//! [`classify`] turns a raw [`TransportOutcome`] into a success carrying the
//! body bytes or a [`NetworkError`]. A client can replace it wholesale with
//! its own [`ResponseHandler`], for instance to accept a status code the
//! request did not list.

use crate::error::NetworkError;
use crate::request::HttpRequest;
use crate::response::{Outcome, ResponseMetadata};
use crate::transport::TransportOutcome;

/// Strategy deciding success or failure for a finished transport call
///
/// `metadata` already carries the sent request and whatever the transport
/// delivered. Implementations must always return an outcome and must not
/// depend on anything but their inputs.
pub trait ResponseHandler: Send + Sync {
    /// Classify one transport outcome
    fn handle(
        &self,
        request: &HttpRequest,
        metadata: ResponseMetadata,
        outcome: TransportOutcome,
    ) -> Outcome<Vec<u8>>;
}

impl<F> ResponseHandler for F
where
    F: Fn(&HttpRequest, ResponseMetadata, TransportOutcome) -> Outcome<Vec<u8>> + Send + Sync,
{
    fn handle(
        &self,
        request: &HttpRequest,
        metadata: ResponseMetadata,
        outcome: TransportOutcome,
    ) -> Outcome<Vec<u8>> {
        self(request, metadata, outcome)
    }
}

/// Handler used when the client has no override
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseHandler;

impl ResponseHandler for DefaultResponseHandler {
    fn handle(
        &self,
        request: &HttpRequest,
        metadata: ResponseMetadata,
        outcome: TransportOutcome,
    ) -> Outcome<Vec<u8>> {
        classify(request, metadata, outcome)
    }
}

/// Default classification
///
/// Checked in order: transport error, missing response, status outside
/// `request.valid_status_codes`, empty body. Anything left is a success.
pub fn classify(
    request: &HttpRequest,
    metadata: ResponseMetadata,
    outcome: TransportOutcome,
) -> Outcome<Vec<u8>> {
    if let Some(error) = outcome.error {
        return Outcome::failure(NetworkError::Transport(error), metadata);
    }

    let Some(response) = outcome.response else {
        return Outcome::failure(NetworkError::NoResponse, metadata);
    };

    if !request.valid_status_codes.contains(&response.status) {
        return Outcome::failure(NetworkError::InvalidStatusCode(response.status), metadata);
    }

    match outcome.data {
        Some(data) if !data.is_empty() => Outcome::success(data, metadata),
        _ => Outcome::failure(NetworkError::NoData, metadata),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TransportError};
    use crate::request::Request;
    use crate::response::ResponseHead;

    fn request(codes: &[u16]) -> HttpRequest {
        Request::get("https://example.com/get")
            .valid_status_codes(codes.iter().copied())
            .materialize(None, &[])
            .expect("Valid request")
    }

    fn head(status: u16) -> ResponseHead {
        ResponseHead::new(status, "https://example.com/get")
    }

    fn network_error(outcome: Outcome<Vec<u8>>) -> NetworkError {
        match outcome.result {
            Err(Error::Network(err)) => err,
            other => panic!("Expected a network error, got {:?}", other),
        }
    }

    #[test]
    fn test_transport_error_wins() {
        let outcome = TransportOutcome {
            response: Some(head(200)),
            data: Some(b"body".to_vec()),
            error: Some(TransportError::Timeout),
        };
        let result = classify(&request(&[200]), ResponseMetadata::default(), outcome);
        assert_eq!(
            network_error(result),
            NetworkError::Transport(TransportError::Timeout)
        );
    }

    #[test]
    fn test_no_response() {
        let outcome = TransportOutcome::default();
        let result = classify(&request(&[200]), ResponseMetadata::default(), outcome);
        assert_eq!(network_error(result), NetworkError::NoResponse);
    }

    #[test]
    fn test_invalid_status_code_carries_actual_status() {
        for status in [200, 301, 404, 503] {
            let outcome = TransportOutcome::response(head(status), b"{}".to_vec());
            let result = classify(&request(&[500]), ResponseMetadata::default(), outcome);
            assert_eq!(
                network_error(result),
                NetworkError::InvalidStatusCode(status)
            );
        }
    }

    #[test]
    fn test_listed_non_2xx_status_is_accepted() {
        let outcome = TransportOutcome::response(head(500), b"oops".to_vec());
        let result = classify(&request(&[500]), ResponseMetadata::default(), outcome);
        assert_eq!(result.result.expect("500 is listed"), b"oops".to_vec());
    }

    #[test]
    fn test_empty_and_missing_body_are_no_data() {
        let empty = TransportOutcome::response(head(200), Vec::new());
        let result = classify(&request(&[200]), ResponseMetadata::default(), empty);
        assert_eq!(network_error(result), NetworkError::NoData);

        let missing = TransportOutcome {
            response: Some(head(204)),
            data: None,
            error: None,
        };
        let result = classify(&request(&[204]), ResponseMetadata::default(), missing);
        assert_eq!(network_error(result), NetworkError::NoData);
    }

    #[test]
    fn test_success_keeps_metadata() {
        let metadata = ResponseMetadata {
            response: Some(head(200)),
            data: Some(b"ok".to_vec()),
            ..Default::default()
        };
        let outcome = TransportOutcome::response(head(200), b"ok".to_vec());
        let result = DefaultResponseHandler.handle(&request(&[200]), metadata.clone(), outcome);
        assert_eq!(result.metadata, metadata);
        assert_eq!(result.result.expect("Success"), b"ok".to_vec());
    }

    #[test]
    fn test_closure_handler() {
        let handler = |_: &HttpRequest, metadata: ResponseMetadata, outcome: TransportOutcome| {
            match outcome.response {
                Some(head) if head.status == 404 => Outcome::success(b"[]".to_vec(), metadata),
                _ => Outcome::failure(NetworkError::NoResponse, metadata),
            }
        };
        let outcome = TransportOutcome::response(head(404), Vec::new());
        let result = handler.handle(&request(&[200]), ResponseMetadata::default(), outcome);
        assert_eq!(result.result.expect("Override accepts 404"), b"[]".to_vec());
    }
}
