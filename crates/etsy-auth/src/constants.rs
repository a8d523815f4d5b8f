//! Etsy OAuth endpoints
//!
//! Both endpoints can be overridden on `TokenAuthority` (tests, proxies).

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://api.etsy.com/v3/public/oauth/token";

/// Authorization endpoint the user is redirected to for consent
pub const AUTHORIZE_ENDPOINT: &str = "https://www.etsy.com/oauth/connect";

/// PKCE verifier entropy in bytes (encodes to 43 base64url characters)
pub const VERIFIER_BYTES: usize = 32;
