//! Etsy Open API v3 resource client
//!
//! `EtsyClient` turns typed operations into `HttpRequest`s, runs each one
//! through the shared `Authorizer` and decodes the JSON reply. Resource
//! operations live in `listing` and `receipt`; this module holds the common
//! send path.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use transport::{
    HeaderName, HeaderValue, HttpRequest, HttpResponse, HttpTransport, Method, Url, header,
};

use crate::authorizer::Authorizer;
use crate::error::{Error, Result};
use crate::params::ToParams;

/// Production API host. Operation paths are absolute (`/v3/application/...`).
pub const DEFAULT_BASE_URL: &str = "https://api.etsy.com";

/// Header carrying the application keystring on every API call.
pub const API_KEY_HEADER: &str = "x-api-key";

/// `etsy-sdk/<version> (Language=rust; Platform=<os>-<arch>)`
pub fn default_user_agent() -> String {
    format!(
        "etsy-sdk/{} (Language=rust; Platform={}-{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

pub struct EtsyClient {
    base_url: Url,
    user_agent: HeaderValue,
    transport: Arc<dyn HttpTransport>,
    authorizer: Arc<Authorizer>,
}

impl fmt::Debug for EtsyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtsyClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}

impl EtsyClient {
    pub fn new(transport: Arc<dyn HttpTransport>, authorizer: Arc<Authorizer>) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            user_agent: header_value(&default_user_agent())?,
            transport,
            authorizer,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent = header_value(user_agent)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn authorizer(&self) -> &Arc<Authorizer> {
        &self.authorizer
    }

    /// Request for `path` relative to the base URL.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<HttpRequest> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::InvalidRequest(format!("invalid path {path}: {e}")))?;
        Ok(HttpRequest::new(method, url))
    }

    pub(crate) fn get(&self, path: &str, query: &impl ToParams) -> Result<HttpRequest> {
        Ok(self.request(Method::GET, path)?.query(&query.to_params())?)
    }

    pub(crate) fn with_form(
        &self,
        method: Method,
        path: &str,
        body: &impl ToParams,
    ) -> Result<HttpRequest> {
        Ok(self.request(method, path)?.form(&body.to_params())?)
    }

    /// Authorize, dispatch and decode the JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<T> {
        self.dispatch(operation, request)
            .await?
            .json()
            .map_err(|e| Error::Decode(format!("{operation}: {e}")))
    }

    /// Authorize and dispatch.
    ///
    /// Nothing is sent when authorization fails. Any status of 300 or above
    /// becomes `Error::Api` with the raw body.
    pub(crate) async fn dispatch(
        &self,
        operation: &'static str,
        mut request: HttpRequest,
    ) -> Result<HttpResponse> {
        request
            .headers
            .insert(header::USER_AGENT, self.user_agent.clone());
        let mut api_key = header_value(self.authorizer.api_key().expose())?;
        api_key.set_sensitive(true);
        request
            .headers
            .insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        self.authorizer.authorize_request(&mut request).await?;

        debug!(
            operation,
            method = %request.method,
            path = request.url.path(),
            "sending Etsy API request"
        );
        let response = self.transport.execute(request).await?;

        if response.status >= 300 {
            warn!(operation, status = response.status, "Etsy API returned an error");
            return Err(Error::Api {
                status: response.status,
                body: response.text(),
            });
        }

        Ok(response)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| Error::Config(format!("invalid base URL {base_url}: {e}")))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidRequest(format!("invalid header value: {e}")))
}
