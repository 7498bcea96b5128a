//! Fluent HTTP requests over a pluggable transport
//!
//! A request is described with a fluent builder, sent exactly once through a
//! [`Transport`], classified by a [`ResponseHandler`] and decoded into the
//! shape the caller asks for: raw bytes, nothing, a JSON value, a `serde`
//! type or a [`mapping`] type. The result can be awaited, delivered to a
//! callback or held as a [`Promise`]; all three see the same outcome and the
//! same [`ResponseMetadata`].
//!
//! # Example
//!
//! ```no_run
//! use courier::{Client, Response};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Echo {
//!     args: std::collections::HashMap<String, String>,
//! }
//!
//! async fn example() -> Response<Echo> {
//!     let client = Client::builder()
//!         .base_url("https://httpbin.org")
//!         .build()
//!         .expect("client");
//!
//!     client
//!         .get("/get")
//!         .query("foo1", "bar1")
//!         .valid_status_codes(200..300)
//!         .decodable()
//!         .await
//! }
//! ```

mod body;
mod call;
mod client;
pub mod connectivity;
pub mod decode;
mod error;
pub mod handler;
#[cfg(feature = "mapping")]
pub mod mapping;
mod promise;
mod request;
mod response;
mod settings;
pub mod transport;

pub use body::{Body, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use call::Call;
pub use client::{
    fetch, init, reset, shared, BaseUrlProvider, Client, ClientBuilder, ClientConfig,
    RequestBuilder,
};
pub use connectivity::{Connectivity, ConnectivityMonitor, ConnectivitySettings, Reachability};
pub use error::{Error, NetworkError, RequestFailure, TransportError};
pub use handler::{DefaultResponseHandler, ResponseHandler};
pub use promise::Promise;
pub use request::{default_valid_status_codes, resolve_url, HttpRequest, Method, Request};
pub use response::{Outcome, Response, ResponseHead, ResponseMetadata};
pub use settings::Settings;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{Transport, TransportOutcome};
