//! HTTP client wrapper

use std::fmt;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::call::Call;
use crate::connectivity::{Connectivity, ConnectivityMonitor};
use crate::decode;
use crate::error::{Error, NetworkError};
use crate::handler::{DefaultResponseHandler, ResponseHandler};
#[cfg(feature = "mapping")]
use crate::mapping::{self, ImmutableMappable, Mappable};
use crate::request::{Method, Request};
use crate::response::{Outcome, Response, ResponseMetadata};
use crate::settings::Settings;
use crate::transport::Transport;
#[cfg(feature = "reqwest")]
use crate::transport::ReqwestTransport;

/// Zero-argument function returning the current base URL
///
/// Evaluated on every request, so the base URL may depend on state that
/// changes at runtime.
pub type BaseUrlProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Configuration shared by every request of a [`Client`]
///
/// Immutable once the client is built.
pub struct ClientConfig {
    base_url: Option<BaseUrlProvider>,
    default_headers: Vec<(String, String)>,
    response_handler: Arc<dyn ResponseHandler>,
    connectivity: Connectivity,
}

impl ClientConfig {
    /// The current base URL, if a provider is configured and returns one
    pub fn base_url(&self) -> Option<String> {
        self.base_url.as_ref().and_then(|provider| provider())
    }

    /// Headers added to every request
    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// The reachability flag consulted before each request
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url())
            .field("default_headers", &self.default_headers)
            .field("connectivity", &self.connectivity.reachability())
            .finish_non_exhaustive()
    }
}

/// HTTP client wrapper
///
/// Cheap to clone; clones share the transport, configuration and any
/// connectivity monitor started by [`ClientBuilder::settings`].
#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    /// Keeps the probe task alive for as long as a clone exists
    #[allow(dead_code)]
    monitor: Option<Arc<ConnectivityMonitor>>,
}

#[cfg(feature = "reqwest")]
impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a client with the reqwest transport and no base URL
    #[cfg(feature = "reqwest")]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    /// Create a client over a custom transport with default configuration
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: Arc::new(ClientConfig {
                base_url: None,
                default_headers: Vec::new(),
                response_handler: Arc::new(DefaultResponseHandler),
                connectivity: Connectivity::new(),
            }),
            monitor: None,
        }
    }

    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // === Request builder methods ===

    /// Request builder for any method
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            client: self.clone(),
            request: Request::new(method, url),
        }
    }

    /// GET request builder
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Get, url)
    }

    /// POST request builder
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Post, url)
    }

    /// PUT request builder
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Put, url)
    }

    /// DELETE request builder
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Delete, url)
    }

    // === Simple convenience methods ===

    /// GET request, returns JSON deserialized to R
    pub async fn fetch<R>(&self, url: &str) -> Response<R>
    where
        R: DeserializeOwned + Send + 'static,
    {
        self.get(url).decodable().await
    }

    /// POST with JSON body, returns JSON deserialized to R
    pub async fn post_json<B, R>(&self, url: &str, body: &B) -> Response<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Send + 'static,
    {
        self.post(url).encodable(body).decodable().await
    }

    // === Core ===

    /// Perform one request and classify the result
    ///
    /// All calling conventions end up here. The base URL provider is read
    /// once, the transport is called at most once and the response handler
    /// decides the outcome.
    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    pub async fn execute(&self, request: Request) -> Outcome<Vec<u8>> {
        let mut metadata = ResponseMetadata::default();

        let http_request = match request.materialize(
            self.config.base_url().as_deref(),
            &self.config.default_headers,
        ) {
            Ok(http_request) => http_request,
            Err(err) => {
                tracing::warn!("Could not build request: {}", err);
                return Outcome::failure(err, metadata);
            }
        };
        metadata.request = Some(http_request.clone());

        if self.config.connectivity.is_unreachable() {
            tracing::warn!(
                "Skipping {} {}: network unreachable",
                http_request.method,
                http_request.url
            );
            return Outcome::failure(NetworkError::NoNetworkConnection, metadata);
        }

        tracing::debug!("Sending {} {}", http_request.method, http_request.url);
        let transport_outcome = self.transport.send(&http_request).await;
        metadata.response = transport_outcome.response.clone();
        metadata.data = transport_outcome.data.clone();

        let outcome = self
            .config
            .response_handler
            .handle(&http_request, metadata, transport_outcome);

        match &outcome.result {
            Ok(data) => tracing::debug!(
                "{} {} succeeded with {} bytes",
                http_request.method,
                http_request.url,
                data.len()
            ),
            Err(err) => tracing::debug!(
                "{} {} failed: {}",
                http_request.method,
                http_request.url,
                err
            ),
        }

        outcome
    }

    fn call(&self, request: Request) -> Call<Vec<u8>> {
        let client = self.clone();
        Call::new(async move { client.execute(request).await })
    }
}

/// Fluent request builder bound to a [`Client`]
///
/// Configure the request, then pick the response shape with one of the
/// terminal methods ([`data`](Self::data), [`void`](Self::void),
/// [`json`](Self::json), [`decodable`](Self::decodable), ...). Each returns a
/// [`Call`] that can be awaited, spawned with a callback or turned into a
/// promise.
#[derive(Debug)]
pub struct RequestBuilder {
    client: Client,
    request: Request,
}

impl RequestBuilder {
    /// Append a query parameter
    pub fn query(self, key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            request: self.request.query(key, value),
            client: self.client,
        }
    }

    /// Append several query parameters
    pub fn queries<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self {
            request: self.request.queries(params),
            client: self.client,
        }
    }

    /// Add a header to the request
    pub fn header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            request: self.request.header(key, value),
            client: self.client,
        }
    }

    /// Add several headers
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            request: self.request.headers(headers),
            client: self.client,
        }
    }

    /// Set the request body as form data
    pub fn form<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self {
            request: self.request.form(params),
            client: self.client,
        }
    }

    /// Set the request body as a JSON dictionary
    pub fn json_body(self, map: Map<String, Value>) -> Self {
        Self {
            request: self.request.json(map),
            client: self.client,
        }
    }

    /// Set the request body as the JSON serialization of `body`
    pub fn encodable<B: Serialize + ?Sized>(self, body: &B) -> Self {
        Self {
            request: self.request.encodable(body),
            client: self.client,
        }
    }

    /// Replace the accepted status codes (default `200..=299`)
    pub fn valid_status_codes<I>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        Self {
            request: self.request.valid_status_codes(codes),
            client: self.client,
        }
    }

    /// Detach the descriptor from the client
    pub fn into_request(self) -> Request {
        self.request
    }

    /// Raw body bytes
    pub fn data(self) -> Call<Vec<u8>> {
        self.client.call(self.request).map(decode::data)
    }

    /// No body expected; an empty body is a success
    pub fn void(self) -> Call<()> {
        self.client.call(self.request).map(decode::void)
    }

    /// Generic JSON value
    pub fn json(self) -> Call<Value> {
        self.client.call(self.request).map(decode::json)
    }

    /// Body deserialized into `T`
    pub fn decodable<T>(self) -> Call<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.client.call(self.request).map(decode::decodable::<T>)
    }

    /// Body mapped into a [`Mappable`]
    #[cfg(feature = "mapping")]
    pub fn object<T>(self) -> Call<T>
    where
        T: Mappable + Send + 'static,
    {
        self.client.call(self.request).map(mapping::object::<T>)
    }

    /// Body mapped into a list of [`Mappable`]
    #[cfg(feature = "mapping")]
    pub fn object_array<T>(self) -> Call<Vec<T>>
    where
        T: Mappable + Send + 'static,
    {
        self.client.call(self.request).map(mapping::object_array::<T>)
    }

    /// Body mapped into an [`ImmutableMappable`]
    #[cfg(feature = "mapping")]
    pub fn immutable_object<T>(self) -> Call<T>
    where
        T: ImmutableMappable + Send + 'static,
    {
        self.client.call(self.request).map(mapping::immutable_object::<T>)
    }

    /// Body mapped into a list of [`ImmutableMappable`]
    #[cfg(feature = "mapping")]
    pub fn immutable_object_array<T>(self) -> Call<Vec<T>>
    where
        T: ImmutableMappable + Send + 'static,
    {
        self.client
            .call(self.request)
            .map(mapping::immutable_object_array::<T>)
    }
}

/// Client builder
#[derive(Default)]
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    base_url: Option<BaseUrlProvider>,
    default_headers: Vec<(String, String)>,
    response_handler: Option<Arc<dyn ResponseHandler>>,
    connectivity: Option<Connectivity>,
    settings: Option<Settings>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("transport", &self.transport)
            .field("default_headers", &self.default_headers)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Use a custom transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a fixed base URL
    pub fn base_url(self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url_provider(move || Some(base_url.clone()))
    }

    /// Resolve the base URL on every request
    pub fn base_url_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.base_url = Some(Arc::new(provider));
        self
    }

    /// Add a header sent with every request
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Replace the default response classification
    pub fn response_handler<H>(mut self, handler: H) -> Self
    where
        H: ResponseHandler + 'static,
    {
        self.response_handler = Some(Arc::new(handler));
        self
    }

    /// Share an existing reachability flag
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Apply settings
    ///
    /// The settings' base URL and headers apply unless set explicitly on the
    /// builder. With `connectivity.enabled` a [`ConnectivityMonitor`] is
    /// started by [`build`](Self::build), which then needs a tokio runtime.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Client, Error> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };

        let mut base_url = self.base_url;
        let mut default_headers = Vec::new();
        let connectivity = self.connectivity.unwrap_or_default();
        let mut monitor = None;

        if let Some(settings) = self.settings {
            if base_url.is_none() {
                if let Some(url) = settings.base_url {
                    base_url = Some(Arc::new(move || Some(url.clone())));
                }
            }
            default_headers.extend(settings.default_headers);
            if settings.connectivity.enabled {
                if tokio::runtime::Handle::try_current().is_err() {
                    return Err(Error::Build(
                        "connectivity monitoring requires a tokio runtime".to_string(),
                    ));
                }
                monitor = Some(Arc::new(ConnectivityMonitor::start(
                    connectivity.clone(),
                    &settings.connectivity,
                )));
            }
        }
        default_headers.extend(self.default_headers);

        Ok(Client {
            transport,
            config: Arc::new(ClientConfig {
                base_url,
                default_headers,
                response_handler: self
                    .response_handler
                    .unwrap_or_else(|| Arc::new(DefaultResponseHandler)),
                connectivity,
            }),
            monitor,
        })
    }
}

#[cfg(feature = "reqwest")]
fn default_transport() -> Result<Arc<dyn Transport>, Error> {
    Ok(Arc::new(ReqwestTransport::new()))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport() -> Result<Arc<dyn Transport>, Error> {
    Err(Error::Build("no transport configured".to_string()))
}

static SHARED: Lazy<RwLock<Option<Client>>> = Lazy::new(|| RwLock::new(None));

/// Install `client` as the shared client
pub fn init(client: Client) {
    match SHARED.write() {
        Ok(mut shared) => *shared = Some(client),
        Err(poisoned) => *poisoned.into_inner() = Some(client),
    }
}

/// Drop the shared client; the next [`shared`] call creates a fresh one
pub fn reset() {
    match SHARED.write() {
        Ok(mut shared) => *shared = None,
        Err(poisoned) => *poisoned.into_inner() = None,
    }
}

/// The shared client, created with defaults on first use
pub fn shared() -> Result<Client, Error> {
    if let Some(client) = SHARED
        .read()
        .map_err(|e| Error::Build(e.to_string()))?
        .as_ref()
    {
        return Ok(client.clone());
    }

    let mut shared = SHARED.write().map_err(|e| Error::Build(e.to_string()))?;
    match shared.as_ref() {
        Some(client) => Ok(client.clone()),
        None => {
            tracing::debug!("Initializing shared client with defaults");
            let client = Client::builder().build()?;
            *shared = Some(client.clone());
            Ok(client)
        }
    }
}

/// Convenience function for simple GET requests on the shared client
pub async fn fetch<R>(url: &str) -> Response<R>
where
    R: DeserializeOwned + Send + 'static,
{
    let client = shared().map_err(|error| {
        crate::error::RequestFailure::new(error, ResponseMetadata::default())
    })?;
    client.fetch(url).await
}
