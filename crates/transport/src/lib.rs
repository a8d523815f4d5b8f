//! HTTP transport abstraction for the Etsy SDK
//!
//! Defines the `HttpTransport` trait that decouples token and resource logic
//! from the HTTP client in use. `ReqwestTransport` is the production
//! implementation; `ScriptedTransport` (feature `test-util`) replays canned
//! responses so callers can be tested without a network.
//!
//! Requests and responses are plain owned values: method, URL, headers and
//! body in; status, headers and body out.

pub mod error;
pub mod reqwest_transport;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use error::{Error, Result};
pub use reqwest_transport::ReqwestTransport;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedTransport;

pub use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, Url};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

/// Content type used for every form-encoded body sent by this SDK.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set (replace) a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace the URL query string with the urlencoded form of `query`.
    ///
    /// An empty encoding leaves the URL without a `?`.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(query)
            .map_err(|e| Error::InvalidRequest(format!("encoding query string: {e}")))?;
        if encoded.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.set_query(Some(&encoded));
        }
        Ok(self)
    }

    /// Set a form-urlencoded body and the matching `Content-Type`.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(form)
            .map_err(|e| Error::InvalidRequest(format!("encoding form body: {e}")))?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(FORM_CONTENT_TYPE),
        );
        self.body = Some(encoded.into_bytes());
        Ok(self)
    }

    /// Body as UTF-8 text, if present. Used by tests and debug logging.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// A completed HTTP exchange as seen by the caller.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded lossily as UTF-8 (for diagnostics and error payloads).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Abstraction over "send an HTTP request, get an HTTP response".
///
/// Non-2xx statuses are not errors at this layer; only failures to complete
/// the exchange are. Uses `Pin<Box<dyn Future>>` return types for
/// dyn-compatibility (`Arc<dyn HttpTransport>`).
pub trait HttpTransport: Send + Sync {
    /// Identifier for logging (e.g. "reqwest", "scripted")
    fn name(&self) -> &str;

    /// Send the request and collect the full response.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>>;
}
