//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Secrets (API key, client secret, refresh token) come from env vars or
//! files referenced by the config, never from the TOML itself.

use common::Secret;
use etsy_auth::Scope;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "ETSY_API_KEY";
pub const CLIENT_SECRET_ENV: &str = "ETSY_CLIENT_SECRET";
pub const REFRESH_TOKEN_ENV: &str = "ETSY_REFRESH_TOKEN";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// OAuth application settings
#[derive(Debug, Deserialize)]
pub struct OAuthConfig {
    /// Etsy app keystring
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    /// Set from ETSY_CLIENT_SECRET or `client_secret_file`. Without it the
    /// app is a public PKCE client.
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub authorize_endpoint: Option<String>,
}

/// Resource API settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_safety_margin")]
    pub safety_margin_secs: u64,
    /// Set from ETSY_API_KEY or `api_key_file`; falls back to the client id
    #[serde(skip)]
    pub api_key: Option<Secret<String>>,
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,
    /// Set from ETSY_REFRESH_TOKEN or `refresh_token_file`
    #[serde(skip)]
    pub refresh_token: Option<Secret<String>>,
    /// Also the destination for the token obtained by `exchange`
    #[serde(default)]
    pub refresh_token_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            safety_margin_secs: default_safety_margin(),
            api_key: None,
            api_key_file: None,
            refresh_token: None,
            refresh_token_file: None,
        }
    }
}

fn default_base_url() -> String {
    etsy_client::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_safety_margin() -> u64 {
    etsy_client::DEFAULT_SAFETY_MARGIN.as_secs()
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Secret resolution order: env var, then the file named in the config.
    /// A configured `api_key_file` or `client_secret_file` must exist; a
    /// missing `refresh_token_file` is allowed since `exchange` creates it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.oauth.client_id.trim().is_empty() {
            return Err(common::Error::Config("oauth.client_id must not be empty".into()));
        }
        if !is_http_url(&config.oauth.redirect_uri) {
            return Err(common::Error::Config(format!(
                "oauth.redirect_uri must start with http:// or https://, got: {}",
                config.oauth.redirect_uri
            )));
        }
        if !is_http_url(&config.api.base_url) {
            return Err(common::Error::Config(format!(
                "api.base_url must start with http:// or https://, got: {}",
                config.api.base_url
            )));
        }
        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }

        config.oauth.client_secret = resolve_secret(
            CLIENT_SECRET_ENV,
            config.oauth.client_secret_file.as_deref(),
            false,
        )?;
        config.api.api_key =
            resolve_secret(API_KEY_ENV, config.api.api_key_file.as_deref(), false)?;
        config.api.refresh_token = resolve_secret(
            REFRESH_TOKEN_ENV,
            config.api.refresh_token_file.as_deref(),
            true,
        )?;

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("etsy-cli.toml")
    }

    /// API key for `x-api-key`: the resolved secret, else the client id.
    pub fn api_key(&self) -> String {
        match &self.api.api_key {
            Some(key) => key.expose().clone(),
            None => self.oauth.client_id.clone(),
        }
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Env var first, then file contents (trimmed). Empty values count as unset.
fn resolve_secret(
    env_var: &str,
    file: Option<&Path>,
    missing_file_ok: bool,
) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env_var) {
        let value = value.trim().to_owned();
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }

    let Some(file) = file else {
        return Ok(None);
    };
    match std::fs::read_to_string(file) {
        Ok(contents) => {
            let contents = Secret::new(contents);
            let value = contents.expose().trim();
            Ok((!value.is_empty()).then(|| Secret::new(value.to_owned())))
        }
        Err(e) if missing_file_ok && e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(common::Error::Config(format!(
            "failed to read {}: {e}",
            file.display()
        ))),
    }
}
