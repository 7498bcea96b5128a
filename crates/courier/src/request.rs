//! Request descriptor

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::body::Body;
use crate::error::{Error, NetworkError};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status codes accepted by default: `200..=299`
pub fn default_valid_status_codes() -> BTreeSet<u16> {
    (200..300).collect()
}

/// The request handed to the transport, with URL, headers and body materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including the query
    pub url: Url,
    /// Headers in the order they are sent
    pub headers: Vec<(String, String)>,
    /// Encoded body
    pub body: Option<Vec<u8>>,
    /// Status codes the default classifier accepts
    pub valid_status_codes: BTreeSet<u16>,
}

impl HttpRequest {
    /// Look up a header value, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Request descriptor
///
/// Built fluently and consumed once by [`crate::Client::execute`]. A body
/// that fails to serialize is remembered and reported when the request is
/// materialized, so the chain never has to be interrupted.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    body: Option<Body>,
    headers: Vec<(String, String)>,
    valid_status_codes: BTreeSet<u16>,
    error: Option<Error>,
}

impl Request {
    /// Create a request for an absolute URL or a path relative to the base URL
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            valid_status_codes: default_valid_status_codes(),
            error: None,
        }
    }

    /// GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    /// DELETE request
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// The method
    pub fn method(&self) -> Method {
        self.method
    }

    /// The URL or path as given
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append several query parameters
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Add several headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set a form-urlencoded body, replacing any previous body
    pub fn form<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.body = Some(Body::Form(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        ));
        self.error = None;
        self
    }

    /// Set a JSON dictionary body, replacing any previous body
    pub fn json(mut self, map: Map<String, Value>) -> Self {
        self.body = Some(Body::Json(map));
        self.error = None;
        self
    }

    /// Set the JSON serialization of `value` as the body, replacing any previous body
    pub fn encodable<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match Body::encodable(value) {
            Ok(body) => {
                self.body = Some(body);
                self.error = None;
            }
            Err(e) => {
                self.body = None;
                self.error = Some(e);
            }
        }
        self
    }

    /// Replace the accepted status codes
    pub fn valid_status_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.valid_status_codes = codes.into_iter().collect();
        self
    }

    /// Resolve the URL, encode the body and assemble the headers
    ///
    /// `base_url` is only consulted when the URL is not absolute.
    /// `default_headers` are applied after the `Content-Type` and before the
    /// request's own headers; a later header replaces an earlier one with the
    /// same name.
    pub fn materialize(
        self,
        base_url: Option<&str>,
        default_headers: &[(String, String)],
    ) -> Result<HttpRequest, Error> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut url = resolve_url(&self.url, base_url)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = Vec::new();
        let body = match self.body {
            Some(body) => {
                let (bytes, content_type) = body.encode()?;
                set_header(&mut headers, "Content-Type", content_type);
                Some(bytes)
            }
            None => None,
        };
        for (key, value) in default_headers.iter().chain(self.headers.iter()) {
            set_header(&mut headers, key, value);
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
            valid_status_codes: self.valid_status_codes,
        })
    }
}

fn set_header(headers: &mut Vec<(String, String)>, key: &str, value: &str) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(key));
    headers.push((key.to_string(), value.to_string()));
}

/// Turn an absolute URL or a base-relative path into an absolute URL
pub fn resolve_url(url: &str, base_url: Option<&str>) -> Result<Url, Error> {
    match Url::parse(url) {
        Ok(parsed) => return Ok(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(_) => return Err(NetworkError::InvalidUrl(url.to_string()).into()),
    }

    let base = base_url.ok_or(NetworkError::MissingBaseUrl)?;
    let joined = if url.is_empty() {
        base.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    };
    Url::parse(&joined).map_err(|_| NetworkError::InvalidUrl(joined).into())
}
