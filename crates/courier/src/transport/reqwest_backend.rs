//! reqwest-based transport

use crate::error::TransportError;
use crate::request::{HttpRequest, Method};
use crate::response::ResponseHead;
use crate::transport::{Transport, TransportOutcome};

/// Transport backed by a [`reqwest::Client`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default reqwest settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a transport from an existing reqwest client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

fn response_head(response: &reqwest::Response) -> ResponseHead {
    ResponseHead {
        status: response.status().as_u16(),
        headers: response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        url: response.url().to_string(),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> TransportOutcome {
        let mut builder = self
            .inner
            .request(request.method.into(), request.url.clone());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return TransportOutcome::error(TransportError::from(e)),
        };
        let head = response_head(&response);

        match response.bytes().await {
            Ok(bytes) => TransportOutcome::response(head, bytes.to_vec()),
            Err(e) => TransportOutcome {
                response: Some(head),
                data: None,
                error: Some(TransportError::from(e)),
            },
        }
    }
}
