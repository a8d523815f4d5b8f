//! Expiry-aware request authorization
//!
//! `Authorizer` owns the single cached access token and its absolute expiry.
//! `authorize_request` checks validity, refreshes through the
//! `TokenAuthority` when needed and sets `Authorization: Bearer <token>`.
//!
//! The check, refresh and state update run under one async mutex, so any
//! number of concurrent callers that find the token stale trigger exactly one
//! refresh. The state is only replaced after a successful token response: a
//! failed, cancelled or timed-out refresh leaves it as it was.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use common::Secret;
use etsy_auth::TokenAuthority;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use transport::{HeaderValue, HttpRequest, header};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};

/// Refresh this long before the server-reported expiry.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Everything the authorizer needs. All three credentials are required.
pub struct AuthorizerConfig {
    pub api_key: Secret<String>,
    /// Long-lived token used for every refresh grant
    pub refresh_token: Secret<String>,
    pub authority: Option<Arc<TokenAuthority>>,
    pub safety_margin: Duration,
}

impl AuthorizerConfig {
    pub fn new(
        api_key: impl Into<String>,
        refresh_token: impl Into<String>,
        authority: Arc<TokenAuthority>,
    ) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            refresh_token: Secret::new(refresh_token.into()),
            authority: Some(authority),
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }
}

impl fmt::Debug for AuthorizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizerConfig")
            .field("api_key", &self.api_key)
            .field("refresh_token", &self.refresh_token)
            .field("authority", &self.authority.is_some())
            .field("safety_margin", &self.safety_margin)
            .finish()
    }
}

/// Cached access token. Replaced wholesale, never field by field.
#[derive(Default)]
struct TokenState {
    access_token: Option<Secret<String>>,
    expires_at: Option<SystemTime>,
}

impl TokenState {
    /// The token, if it is non-empty and `now` is strictly before
    /// `expires_at - margin`.
    fn usable(&self, now: SystemTime, margin: Duration) -> Option<&Secret<String>> {
        let token = self.access_token.as_ref().filter(|t| !t.is_empty())?;
        let refresh_at = self.expires_at?.checked_sub(margin)?;
        (now < refresh_at).then_some(token)
    }
}

/// Attaches a valid bearer token to outbound requests.
pub struct Authorizer {
    api_key: Secret<String>,
    refresh_token: Secret<String>,
    authority: Arc<TokenAuthority>,
    safety_margin: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<TokenState>,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("authority", &self.authority)
            .field("safety_margin", &self.safety_margin)
            .finish_non_exhaustive()
    }
}

impl Authorizer {
    /// Validate the configuration and build an authorizer on the system clock.
    ///
    /// No network call is made; the first token is fetched lazily.
    pub fn new(config: AuthorizerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AuthorizerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.refresh_token.is_empty() {
            return Err(Error::Config("refresh token is required".into()));
        }
        if config.api_key.is_empty() {
            return Err(Error::Config("API key is required".into()));
        }
        let authority = config
            .authority
            .ok_or_else(|| Error::Config("token authority is required".into()))?;

        Ok(Self {
            api_key: config.api_key,
            refresh_token: config.refresh_token,
            authority,
            safety_margin: config.safety_margin,
            clock,
            state: Mutex::new(TokenState::default()),
        })
    }

    /// API key sent alongside the bearer token on every Etsy call.
    pub fn api_key(&self) -> &Secret<String> {
        &self.api_key
    }

    pub fn authority(&self) -> &Arc<TokenAuthority> {
        &self.authority
    }

    /// Expiry of the cached token, `None` until the first successful refresh.
    pub async fn expires_at(&self) -> Option<SystemTime> {
        self.state.lock().await.expires_at
    }

    /// Ensure a valid token and set the `Authorization` header on `request`,
    /// replacing any existing value.
    ///
    /// On refresh failure returns `Error::TokenRefresh` and leaves the request
    /// untouched.
    pub async fn authorize_request(&self, request: &mut HttpRequest) -> Result<()> {
        let value = self.bearer().await?;
        request.headers.insert(header::AUTHORIZATION, value);
        Ok(())
    }

    /// `authorize_request` bounded by `deadline`.
    ///
    /// If the deadline passes first the in-flight refresh is dropped, the
    /// token state is unchanged and `Error::DeadlineExceeded` is returned.
    pub async fn authorize_request_by(
        &self,
        request: &mut HttpRequest,
        deadline: Instant,
    ) -> Result<()> {
        match tokio::time::timeout_at(deadline, self.bearer()).await {
            Ok(value) => {
                request.headers.insert(header::AUTHORIZATION, value?);
                Ok(())
            }
            Err(_) => {
                warn!("authorization deadline exceeded");
                Err(Error::DeadlineExceeded)
            }
        }
    }

    /// Refresh now regardless of the cached token's validity.
    pub async fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await.map(drop)
    }

    async fn bearer(&self) -> Result<HeaderValue> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        if let Some(token) = state.usable(now, self.safety_margin) {
            return bearer_value(token).map_err(|e| Error::InvalidRequest(e.to_string()));
        }

        debug!(
            has_token = state.access_token.is_some(),
            "access token missing or inside safety margin, refreshing"
        );
        self.refresh_locked(&mut state).await
    }

    /// Run the refresh grant and replace `state` on success.
    async fn refresh_locked(&self, state: &mut TokenState) -> Result<HeaderValue> {
        let response = self
            .authority
            .refresh_token(self.refresh_token.expose())
            .await
            .map_err(|e| {
                warn!(error = %e, "access token refresh failed");
                Error::TokenRefresh(e)
            })?;

        if response.access_token.is_empty() {
            warn!("token endpoint returned an empty access token");
            return Err(Error::TokenRefresh(etsy_auth::Error::Decode(
                "empty access_token".into(),
            )));
        }
        let value = bearer_value(&response.access_token).map_err(Error::TokenRefresh)?;

        if response.refresh_token.is_some() {
            debug!("token response carried a rotated refresh token, keeping the configured one");
        }

        let Some(expires_at) = self.clock.now().checked_add(response.lifetime()) else {
            warn!(expires_in = response.expires_in, "token endpoint returned an unusable lifetime");
            return Err(Error::TokenRefresh(etsy_auth::Error::Decode(
                "expires_in out of range".into(),
            )));
        };
        *state = TokenState {
            access_token: Some(response.access_token),
            expires_at: Some(expires_at),
        };

        info!(
            expires_in = response.expires_in,
            token_type = %response.token_type,
            "access token refreshed"
        );
        Ok(value)
    }
}

fn bearer_value(token: &Secret<String>) -> etsy_auth::Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
        .map_err(|e| etsy_auth::Error::Decode(format!("access token is not a valid header value: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}
