//! Etsy CLI
//!
//! Small operator tool around the SDK:
//! 1. `authorize-url` starts the OAuth consent flow
//! 2. `exchange` finishes it and stores the long-lived refresh token
//! 3. `listing`, `receipts` and `receipt` make authorized API calls, refreshing
//!    the access token as needed
//!
//! Command output is JSON on stdout; logs are JSON on stderr.

mod cli;
mod config;
mod error;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use etsy_auth::{RefreshTokenFile, TokenAuthority};
use etsy_client::{
    Authorizer, AuthorizerConfig, EtsyClient, GetListingParams, GetShopReceiptsParams,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::{HttpTransport, ReqwestTransport};

use crate::cli::{Args, Command, USAGE};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))
        .map_err(|e| anyhow::anyhow!("{e}\n\n{USAGE}"))?;
    if args.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config_path = Config::resolve_path(args.config_path.as_deref());
    info!(path = %config_path.display(), command = args.command.name(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::with_timeout(Duration::from_secs(config.api.timeout_secs))
            .context("failed to build HTTP transport")?,
    );
    let authority = Arc::new(build_authority(&config, transport.clone())?);

    match args.command {
        Command::AuthorizeUrl => authorize_url(&config, &authority),
        Command::Exchange { code, verifier } => {
            exchange(&config, &authority, &code, &verifier).await
        }
        Command::Listing { listing_id } => {
            let client = build_client(&config, transport, authority)?;
            let listing = client
                .get_listing(listing_id, &GetListingParams::default())
                .await
                .with_context(|| format!("failed to fetch listing {listing_id}"))?;
            print_json(&listing)
        }
        Command::Receipts { shop_id, limit } => {
            let client = build_client(&config, transport, authority)?;
            let params = GetShopReceiptsParams {
                limit,
                ..Default::default()
            };
            let receipts = client
                .get_shop_receipts(shop_id, &params)
                .await
                .with_context(|| format!("failed to fetch receipts for shop {shop_id}"))?;
            print_json(&receipts)
        }
        Command::Receipt {
            shop_id,
            receipt_id,
        } => {
            let client = build_client(&config, transport, authority)?;
            let receipt = client
                .get_shop_receipt(shop_id, receipt_id)
                .await
                .with_context(|| format!("failed to fetch receipt {receipt_id}"))?;
            print_json(&receipt)
        }
        Command::Help => Ok(()),
    }
}

/// PKCE client unless a client secret is configured.
fn build_authority(config: &Config, transport: Arc<dyn HttpTransport>) -> Result<TokenAuthority> {
    let oauth = &config.oauth;
    let mut authority = match &oauth.client_secret {
        Some(secret) => TokenAuthority::with_client_secret(
            oauth.client_id.as_str(),
            secret.expose().as_str(),
            oauth.redirect_uri.as_str(),
            transport,
        ),
        None => TokenAuthority::pkce(
            oauth.client_id.as_str(),
            oauth.redirect_uri.as_str(),
            transport,
        ),
    }
    .context("invalid OAuth settings")?;

    if let Some(endpoint) = &oauth.token_endpoint {
        authority = authority
            .token_endpoint(endpoint)
            .context("invalid oauth.token_endpoint")?;
    }
    if let Some(endpoint) = &oauth.authorize_endpoint {
        authority = authority
            .authorize_endpoint(endpoint)
            .context("invalid oauth.authorize_endpoint")?;
    }
    Ok(authority)
}

fn build_client(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
    authority: Arc<TokenAuthority>,
) -> Result<EtsyClient> {
    let refresh_token = config.api.refresh_token.as_ref().context(
        "no refresh token: set ETSY_REFRESH_TOKEN or api.refresh_token_file (run `exchange` first)",
    )?;
    let authorizer_config = AuthorizerConfig::new(
        config.api_key(),
        refresh_token.expose().as_str(),
        authority,
    )
    .with_safety_margin(Duration::from_secs(config.api.safety_margin_secs));
    let authorizer = Authorizer::new(authorizer_config).context("invalid client credentials")?;

    let client = EtsyClient::new(transport, Arc::new(authorizer))?
        .with_base_url(&config.api.base_url)
        .context("invalid api.base_url")?;
    Ok(client)
}

#[derive(Debug, Serialize)]
struct AuthorizeUrlOutput<'a> {
    url: &'a str,
    verifier: &'a str,
    state: &'a str,
}

fn authorize_url(config: &Config, authority: &TokenAuthority) -> Result<()> {
    if config.oauth.scopes.is_empty() {
        warn!("no scopes configured, the token will only reach public endpoints");
    }
    let request = authority.begin_authorization(&config.oauth.scopes);
    print_json(&AuthorizeUrlOutput {
        url: request.url.as_str(),
        verifier: request.verifier.expose(),
        state: &request.state,
    })
}

#[derive(Debug, Serialize)]
struct ExchangeOutput<'a> {
    token_type: &'a str,
    scope: &'a str,
    expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token_file: Option<String>,
    /// Only printed when there is no file to store it in
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

async fn exchange(
    config: &Config,
    authority: &TokenAuthority,
    code: &str,
    verifier: &str,
) -> Result<()> {
    let token = authority
        .exchange_code(code, Some(verifier))
        .await
        .context("authorization code exchange failed")?;

    let mut output = ExchangeOutput {
        token_type: &token.token_type,
        scope: &token.scope,
        expires_in: token.expires_in,
        refresh_token_file: None,
        refresh_token: None,
    };

    match (&config.api.refresh_token_file, &token.refresh_token) {
        (Some(path), Some(refresh)) => {
            let file = RefreshTokenFile::new(path);
            file.save(refresh)
                .await
                .with_context(|| format!("failed to save refresh token to {}", path.display()))?;
            info!(path = %path.display(), "refresh token saved");
            output.refresh_token_file = Some(path.display().to_string());
        }
        (None, Some(refresh)) => output.refresh_token = Some(refresh.expose().as_str()),
        (_, None) => warn!("token response did not include a refresh token"),
    }

    print_json(&output)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{json}");
    Ok(())
}
