//! Response decoders
//!
//! Each decoder takes the classified byte outcome and reshapes the success
//! value. Metadata passes through untouched.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::response::Outcome;

/// Body bytes as received
pub fn data(outcome: Outcome<Vec<u8>>) -> Outcome<Vec<u8>> {
    outcome
}

/// Discard the body, treating an empty body as success
pub fn void(outcome: Outcome<Vec<u8>>) -> Outcome<()> {
    outcome.map_result(|result| match result {
        Ok(_) => Ok(()),
        Err(Error::Network(err)) if err.is_no_data() => Ok(()),
        Err(err) => Err(err),
    })
}

/// Parse the body as a generic JSON value
pub fn json(outcome: Outcome<Vec<u8>>) -> Outcome<Value> {
    decodable(outcome)
}

/// Deserialize the body into `T`
pub fn decodable<T: DeserializeOwned>(outcome: Outcome<Vec<u8>>) -> Outcome<T> {
    outcome.and_then(|bytes| {
        serde_json::from_slice::<T>(&bytes).map_err(|err| {
            tracing::warn!(
                "Could not decode response body into {}: {}",
                std::any::type_name::<T>(),
                err
            );
            Error::from(err)
        })
    })
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::body::Body;
    use crate::error::{NetworkError, TransportError};
    use crate::response::ResponseMetadata;

    fn ok(bytes: &[u8]) -> Outcome<Vec<u8>> {
        Outcome::success(bytes.to_vec(), ResponseMetadata::default())
    }

    fn err(error: NetworkError) -> Outcome<Vec<u8>> {
        Outcome::failure(error, ResponseMetadata::default())
    }

    fn cases() -> Vec<Result<Vec<u8>, NetworkError>> {
        vec![
            Ok(b"{}".to_vec()),
            Err(NetworkError::NoData),
            Err(NetworkError::InvalidStatusCode(500)),
            Err(NetworkError::NoResponse),
            Err(NetworkError::NoNetworkConnection),
            Err(NetworkError::Transport(TransportError::Timeout)),
        ]
    }

    fn outcome(case: &Result<Vec<u8>, NetworkError>) -> Outcome<Vec<u8>> {
        match case {
            Ok(bytes) => ok(bytes),
            Err(error) => err(error.clone()),
        }
    }

    #[test]
    fn test_data_passthrough() {
        let outcome = data(ok(b"raw"));
        assert_eq!(outcome.result.expect("Success"), b"raw".to_vec());
    }

    #[test]
    fn test_void_accepts_no_data() {
        assert!(void(err(NetworkError::NoData)).result.is_ok());
        assert!(void(ok(b"ignored")).result.is_ok());
    }

    #[test]
    fn test_void_propagates_other_failures() {
        let outcome = void(err(NetworkError::InvalidStatusCode(404)));
        assert_eq!(outcome.result.expect_err("Failure").status_code(), Some(404));
    }

    #[test]
    fn test_void_matches_bytes_with_no_data_rule() {
        for case in cases() {
            let bytes_ok = match data(outcome(&case)).result {
                Ok(_) => true,
                Err(Error::Network(NetworkError::NoData)) => true,
                Err(_) => false,
            };
            assert_eq!(void(outcome(&case)).result.is_ok(), bytes_ok, "case: {case:?}");
        }
    }

    #[test]
    fn test_void_keeps_metadata() {
        let metadata = ResponseMetadata {
            data: Some(Vec::new()),
            ..Default::default()
        };
        let outcome = void(Outcome::failure(NetworkError::NoData, metadata.clone()));
        assert_eq!(outcome.metadata, metadata);
    }

    #[test]
    fn test_json_value() {
        let outcome = json(ok(br#"{"args": {"foo": "bar"}}"#));
        assert_eq!(
            outcome.result.expect("Valid JSON"),
            json!({"args": {"foo": "bar"}})
        );
    }

    #[test]
    fn test_json_parse_error_is_passed_through() {
        let outcome = json(ok(b"<html>"));
        assert!(matches!(outcome.result, Err(Error::Json(_))));
    }

    #[test]
    fn test_decodable_type_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            count: u32,
        }
        let outcome = decodable::<Expected>(ok(br#"{"count": "three"}"#));
        assert!(matches!(outcome.result, Err(Error::Json(_))));
    }

    #[test]
    fn test_decodable_propagates_classification() {
        let outcome = decodable::<Value>(err(NetworkError::NoData));
        assert!(matches!(
            outcome.result,
            Err(Error::Network(NetworkError::NoData))
        ));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Item {
            id: u64,
            name: String,
            ratio: f64,
            tags: Vec<String>,
        }

        let item = Item {
            id: 99,
            name: "widget".into(),
            ratio: 0.25,
            tags: vec!["x".into()],
        };
        let (bytes, _) = Body::encodable(&item)
            .and_then(|body| body.encode())
            .expect("Encodable");
        let decoded = decodable::<Item>(ok(&bytes)).result.expect("Round trip");
        assert_eq!(decoded, item);
    }
}
