//! OAuth token exchange and refresh
//!
//! `TokenAuthority` performs the two token endpoint interactions:
//! 1. Authorization code exchange (completes the redirect flow)
//! 2. Token refresh (called by the authorizing client when its token expires)
//!
//! Both POST a form-encoded grant to the token endpoint. Public clients prove
//! possession with the PKCE verifier; confidential clients authenticate with
//! HTTP Basic `client_id:client_secret`. The HTTP machinery is shared and the
//! authority holds no mutable state, so one instance can serve many tasks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Secret;
use serde::Deserialize;
use tracing::{debug, info, warn};
use transport::{HeaderValue, HttpRequest, HttpTransport, Method, Url, header};

use crate::constants::{AUTHORIZE_ENDPOINT, TOKEN_ENDPOINT};
use crate::error::{Error, Result};
use crate::pkce::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
use crate::scope::Scope;

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time. Tokens are
/// wrapped in `Secret` so the derived `Debug` never prints them.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Secret<String>,
    /// Present on code exchange; may be a rotated token on refresh
    #[serde(default)]
    pub refresh_token: Option<Secret<String>>,
    #[serde(default)]
    pub token_type: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

impl TokenResponse {
    /// Lifetime of the access token as reported by the server.
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

/// How the client proves its identity to the token endpoint.
#[derive(Clone)]
pub enum ClientAuth {
    /// Public client: no secret, the PKCE verifier binds the code exchange.
    Pkce,
    /// Confidential client: HTTP Basic with the client secret on every grant.
    ClientSecret(Secret<String>),
}

impl fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientAuth::Pkce => f.write_str("Pkce"),
            ClientAuth::ClientSecret(_) => f.write_str("ClientSecret([REDACTED])"),
        }
    }
}

impl ClientAuth {
    fn label(&self) -> &'static str {
        match self {
            ClientAuth::Pkce => "pkce",
            ClientAuth::ClientSecret(_) => "client_secret",
        }
    }
}

/// Everything needed to send the user to the consent page and later finish
/// the exchange. Keep `verifier` and `state` until the redirect comes back.
#[derive(Debug)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub verifier: Secret<String>,
    pub state: String,
}

/// Talks to the authorization server's token endpoint.
pub struct TokenAuthority {
    client_id: String,
    redirect_uri: String,
    auth: ClientAuth,
    token_endpoint: Url,
    authorize_endpoint: Url,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("auth", &self.auth)
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("transport", &self.transport.name())
            .finish()
    }
}

impl TokenAuthority {
    /// Create an authority for the given client with Etsy's default endpoints.
    ///
    /// Fails if the client id or redirect URI is empty, or a client secret is
    /// supplied empty.
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        auth: ClientAuth,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let redirect_uri = redirect_uri.into();
        if client_id.is_empty() {
            return Err(Error::Config("client_id must not be empty".into()));
        }
        if redirect_uri.is_empty() {
            return Err(Error::Config("redirect_uri must not be empty".into()));
        }
        if let ClientAuth::ClientSecret(secret) = &auth
            && secret.is_empty()
        {
            return Err(Error::Config("client_secret must not be empty".into()));
        }

        Ok(Self {
            client_id,
            redirect_uri,
            auth,
            token_endpoint: parse_endpoint(TOKEN_ENDPOINT)?,
            authorize_endpoint: parse_endpoint(AUTHORIZE_ENDPOINT)?,
            transport,
        })
    }

    /// Public (PKCE) client.
    pub fn pkce(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        Self::new(client_id, redirect_uri, ClientAuth::Pkce, transport)
    }

    /// Confidential client authenticating with HTTP Basic.
    pub fn with_client_secret(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let secret = Secret::new(client_secret.into());
        Self::new(
            client_id,
            redirect_uri,
            ClientAuth::ClientSecret(secret),
            transport,
        )
    }

    /// Override the token endpoint.
    pub fn token_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.token_endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    /// Override the authorization (consent page) endpoint.
    pub fn authorize_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.authorize_endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_auth(&self) -> &ClientAuth {
        &self.auth
    }

    /// Authorization URL for an existing verifier and state.
    pub fn authorization_url(&self, scopes: &[Scope], state: &str, verifier: &str) -> Url {
        build_authorization_url(
            &self.authorize_endpoint,
            &self.client_id,
            &self.redirect_uri,
            scopes,
            state,
            &compute_challenge(verifier),
        )
    }

    /// Start a new authorization flow: fresh verifier, fresh state, and the URL.
    pub fn begin_authorization(&self, scopes: &[Scope]) -> AuthorizationRequest {
        let verifier = generate_verifier();
        let state = generate_state();
        let url = self.authorization_url(scopes, &state, &verifier);
        AuthorizationRequest {
            url,
            verifier: Secret::new(verifier),
            state,
        }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// A PKCE client must pass the verifier that matches the challenge from
    /// the authorization URL. A confidential client may omit it.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse> {
        if code.is_empty() {
            return Err(Error::Config("authorization code must not be empty".into()));
        }

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", code),
        ];
        match (code_verifier, &self.auth) {
            (Some(verifier), _) => form.push(("code_verifier", verifier)),
            (None, ClientAuth::Pkce) => {
                return Err(Error::Config(
                    "PKCE code exchange requires a code verifier".into(),
                ));
            }
            (None, ClientAuth::ClientSecret(_)) => {}
        }

        self.request_token("authorization_code", &form).await
    }

    /// Obtain a new access token with a long-lived refresh token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        if refresh_token.is_empty() {
            return Err(Error::Config("refresh token must not be empty".into()));
        }

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];
        self.request_token("refresh_token", &form).await
    }

    /// POST one grant and decode the token response.
    async fn request_token(&self, grant: &'static str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let mut request = HttpRequest::new(Method::POST, self.token_endpoint.clone())
            .form(form)?
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let ClientAuth::ClientSecret(secret) = &self.auth {
            request
                .headers
                .insert(header::AUTHORIZATION, basic_auth(&self.client_id, secret)?);
        }

        debug!(
            grant,
            client_auth = self.auth.label(),
            transport = self.transport.name(),
            "requesting token"
        );

        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            let body = response.text();
            warn!(grant, status = response.status, "token endpoint rejected grant");
            return Err(Error::AuthServer {
                status: response.status,
                body,
            });
        }

        let token = response
            .json::<TokenResponse>()
            .map_err(|e| Error::Decode(format!("{grant} response: {e}")))?;

        info!(
            grant,
            expires_in = token.expires_in,
            scope = %token.scope,
            "token issued"
        );
        Ok(token)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    Url::parse(endpoint).map_err(|e| Error::Config(format!("invalid endpoint {endpoint}: {e}")))
}

/// `Authorization: Basic base64(client_id:client_secret)`, marked sensitive.
fn basic_auth(client_id: &str, secret: &Secret<String>) -> Result<HeaderValue> {
    let credentials = STANDARD.encode(format!("{client_id}:{}", secret.expose()));
    let mut value = HeaderValue::from_str(&format!("Basic {credentials}"))
        .map_err(|e| Error::Config(format!("invalid client credentials: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use transport::ScriptedTransport;

    const TEST_ENDPOINT: &str = "https://auth.test/v3/public/oauth/token";

    fn pkce_authority(transport: Arc<ScriptedTransport>) -> TokenAuthority {
        TokenAuthority::pkce("keystring", "https://app.test/callback", transport)
            .unwrap()
            .token_endpoint(TEST_ENDPOINT)
            .unwrap()
    }

    fn secret_authority(transport: Arc<ScriptedTransport>) -> TokenAuthority {
        TokenAuthority::with_client_secret(
            "keystring",
            "shared-secret",
            "https://app.test/callback",
            transport,
        )
        .unwrap()
        .token_endpoint(TEST_ENDPOINT)
        .unwrap()
    }

    fn form_of(request: &HttpRequest) -> HashMap<String, String> {
        let body = request.body_text().unwrap();
        transport::Url::parse(&format!("https://x.test/?{body}"))
            .unwrap()
            .query_pairs()
            .into_owned()
            .collect()
    }

    fn token_json() -> serde_json::Value {
        serde_json::json!({
            "access_token": "12345678.at_abc",
            "refresh_token": "12345678.rt_def",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "listings_r transactions_r"
        })
    }

    #[test]
    fn token_response_deserializes() {
        let json = r#"{"access_token":"at_abc","refresh_token":"rt_def","token_type":"Bearer","expires_in":3600,"scope":"listings_r"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token.expose(), "at_abc");
        assert_eq!(token.refresh_token.as_ref().unwrap().expose(), "rt_def");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.lifetime(), Duration::from_secs(3600));
        assert_eq!(token.scope, "listings_r");
    }

    #[test]
    fn token_response_optional_fields_default() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok1","expires_in":60}"#).unwrap();
        assert!(token.refresh_token.is_none());
        assert_eq!(token.token_type, "");
        assert_eq!(token.scope, "");
    }

    #[test]
    fn token_response_debug_redacts_tokens() {
        let token: TokenResponse = serde_json::from_value(token_json()).unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("at_abc"), "{debug}");
        assert!(!debug.contains("rt_def"), "{debug}");
    }

    #[test]
    fn construction_rejects_missing_fields() {
        let transport = Arc::new(ScriptedTransport::new());
        assert!(matches!(
            TokenAuthority::pkce("", "https://app.test/cb", transport.clone()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TokenAuthority::pkce("id", "", transport.clone()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TokenAuthority::with_client_secret("id", "", "https://app.test/cb", transport.clone()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TokenAuthority::pkce("id", "https://app.test/cb", transport)
                .unwrap()
                .token_endpoint("not a url"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn debug_hides_client_secret() {
        let authority = secret_authority(Arc::new(ScriptedTransport::new()));
        let debug = format!("{authority:?}");
        assert!(!debug.contains("shared-secret"), "{debug}");
        assert!(debug.contains("ClientSecret([REDACTED])"), "{debug}");
    }

    #[tokio::test]
    async fn exchange_code_pkce_sends_verifier_form() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        let authority = pkce_authority(transport.clone());

        let token = authority
            .exchange_code("auth-code-1", Some("verifier-xyz"))
            .await
            .unwrap();
        assert_eq!(token.access_token.expose(), "12345678.at_abc");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), TEST_ENDPOINT);
        assert_eq!(
            request.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert!(request.headers.get(header::AUTHORIZATION).is_none());

        let form = form_of(request);
        assert_eq!(form["grant_type"], "authorization_code");
        assert_eq!(form["client_id"], "keystring");
        assert_eq!(form["redirect_uri"], "https://app.test/callback");
        assert_eq!(form["code"], "auth-code-1");
        assert_eq!(form["code_verifier"], "verifier-xyz");
    }

    #[tokio::test]
    async fn exchange_code_pkce_requires_verifier() {
        let transport = Arc::new(ScriptedTransport::new());
        let authority = pkce_authority(transport.clone());

        let err = authority.exchange_code("code", None).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(transport.call_count(), 0, "no request without a verifier");
    }

    #[tokio::test]
    async fn exchange_code_client_secret_uses_basic_auth() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        let authority = secret_authority(transport.clone());

        authority.exchange_code("auth-code-1", None).await.unwrap();

        let request = &transport.requests()[0];
        // base64("keystring:shared-secret")
        assert_eq!(
            request.headers.get(header::AUTHORIZATION).unwrap(),
            "Basic a2V5c3RyaW5nOnNoYXJlZC1zZWNyZXQ="
        );
        assert!(
            request
                .headers
                .get(header::AUTHORIZATION)
                .unwrap()
                .is_sensitive()
        );
        let form = form_of(request);
        assert_eq!(form["grant_type"], "authorization_code");
        assert!(!form.contains_key("code_verifier"));
    }

    #[tokio::test]
    async fn refresh_token_pkce_form() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        let authority = pkce_authority(transport.clone());

        let token = authority.refresh_token("12345678.rt_long").await.unwrap();
        assert_eq!(token.expires_in, 3600);

        let request = &transport.requests()[0];
        assert!(request.headers.get(header::AUTHORIZATION).is_none());
        let form = form_of(request);
        assert_eq!(form.len(), 3);
        assert_eq!(form["grant_type"], "refresh_token");
        assert_eq!(form["refresh_token"], "12345678.rt_long");
        assert_eq!(form["client_id"], "keystring");
    }

    #[tokio::test]
    async fn refresh_token_client_secret_adds_basic_auth() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        let authority = secret_authority(transport.clone());

        authority.refresh_token("rt").await.unwrap();

        let request = &transport.requests()[0];
        let auth = request.headers.get(header::AUTHORIZATION).unwrap();
        assert!(auth.to_str().unwrap().starts_with("Basic "));
        assert_eq!(form_of(request)["grant_type"], "refresh_token");
    }

    #[tokio::test]
    async fn non_2xx_is_auth_server_error_with_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(400, r#"{"error":"invalid_grant"}"#);
        let authority = pkce_authority(transport);

        let err = authority.refresh_token("rt_revoked").await.unwrap_err();
        match err {
            Error::AuthServer { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, r#"{"error":"invalid_grant"}"#);
            }
            other => panic!("expected AuthServer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_transport_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error(transport::Error::Send("connection refused".into()));
        let authority = pkce_authority(transport);

        let err = authority.refresh_token("rt").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(200, "<html>maintenance</html>");
        transport.push_json(200, serde_json::json!({"token_type": "Bearer"}));
        let authority = pkce_authority(transport);

        let err = authority.refresh_token("rt").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");

        // Valid JSON, wrong shape (no access_token)
        let err = authority.refresh_token("rt").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_inputs_fail_before_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let authority = pkce_authority(transport.clone());

        assert!(matches!(
            authority.refresh_token("").await,
            Err(Error::Config(_))
        ));
        assert!(matches!(
            authority.exchange_code("", Some("v")).await,
            Err(Error::Config(_))
        ));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn begin_authorization_binds_verifier_to_challenge() {
        let authority = pkce_authority(Arc::new(ScriptedTransport::new()));
        let request = authority.begin_authorization(&[Scope::ListingsRead]);

        let params: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
        assert_eq!(params["state"], request.state);
        assert_eq!(
            params["code_challenge"],
            compute_challenge(request.verifier.expose())
        );
        assert_eq!(params["client_id"], "keystring");
        assert_eq!(params["scope"], "listings_r");
        assert!(request.url.as_str().starts_with(AUTHORIZE_ENDPOINT));
    }

    #[test]
    fn authorize_endpoint_override() {
        let authority = pkce_authority(Arc::new(ScriptedTransport::new()))
            .authorize_endpoint("https://consent.test/connect")
            .unwrap();
        let url = authority.authorization_url(&[], "s", "v");
        assert!(url.as_str().starts_with("https://consent.test/connect?"));
    }
}
