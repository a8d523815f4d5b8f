//! Etsy OAuth 2.0 token authority
//!
//! Provides PKCE flow generation, authorization code exchange, token refresh
//! and refresh-token file storage. The crate knows nothing about API requests;
//! `etsy-client` builds the expiry-aware authorizer on top of it.
//!
//! Flow:
//! 1. `TokenAuthority::begin_authorization()` yields the consent URL, verifier and state
//! 2. The user approves and Etsy redirects back with `code` and `state`
//! 3. `TokenAuthority::exchange_code()` trades the code for tokens
//! 4. The refresh token is kept via `RefreshTokenFile::save()`
//! 5. `TokenAuthority::refresh_token()` mints short-lived access tokens on demand

pub mod constants;
pub mod credentials;
pub mod error;
pub mod pkce;
pub mod scope;
pub mod token;

pub use constants::*;
pub use credentials::RefreshTokenFile;
pub use error::{Error, Result};
pub use pkce::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
pub use scope::{Scope, join_scopes};
pub use token::{AuthorizationRequest, ClientAuth, TokenAuthority, TokenResponse};
