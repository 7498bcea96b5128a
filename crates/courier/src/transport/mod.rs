//! HTTP transport backends
//!
//! A [`Transport`] performs exactly one network call for a materialized
//! request and reports back whatever it got: a response head, body bytes
//! and/or a transport error. Classification happens later, in
//! [`crate::handler`].

use std::fmt::Debug;

use crate::error::TransportError;
use crate::request::HttpRequest;
use crate::response::ResponseHead;

#[cfg(feature = "reqwest")]
mod reqwest_backend;

#[cfg(feature = "reqwest")]
pub use reqwest_backend::ReqwestTransport;

/// Raw outcome of one transport call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOutcome {
    /// Response head, if the server answered
    pub response: Option<ResponseHead>,
    /// Body bytes, if any were read
    pub data: Option<Vec<u8>>,
    /// Transport failure, if any
    pub error: Option<TransportError>,
}

impl TransportOutcome {
    /// A response with a body
    pub fn response(head: ResponseHead, data: Vec<u8>) -> Self {
        Self {
            response: Some(head),
            data: Some(data),
            error: None,
        }
    }

    /// A transport failure with nothing received
    pub fn error(error: TransportError) -> Self {
        Self {
            response: None,
            data: None,
            error: Some(error),
        }
    }
}

/// Performs one HTTP call per invocation
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait Transport: Send + Sync + Debug {
    /// Send the request and deliver exactly one outcome
    async fn send(&self, request: &HttpRequest) -> TransportOutcome;
}
