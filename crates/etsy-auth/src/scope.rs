//! OAuth scopes accepted by the Etsy authorization endpoint

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A permission requested during authorization.
///
/// Rendered as Etsy's scope identifiers (`listings_r`, `transactions_w`, ...)
/// and parsed back from them, so configuration files can list them as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Scope {
    /// Read a member's shipping addresses.
    AddressRead,
    /// Update and delete a member's shipping address.
    AddressWrite,
    /// Read a member's bill charges and payments.
    BillingRead,
    /// Read the contents of a member's cart.
    CartRead,
    /// Add and remove listings from a member's cart.
    CartWrite,
    /// Read a user profile's email.
    EmailRead,
    /// View a member's favorite listings and users.
    FavoritesRead,
    /// Add to and remove from a member's favorites.
    FavoritesWrite,
    /// View a member's feedback, including purchase history.
    FeedbackRead,
    /// Delete a member's listings.
    ListingsDelete,
    /// Read a member's inactive and expired listings.
    ListingsRead,
    /// Create and edit a member's listings.
    ListingsWrite,
    /// Read a member's private profile information.
    ProfileRead,
    /// Update a member's private profile information.
    ProfileWrite,
    /// View a member's recommended listings.
    RecommendRead,
    /// Remove a member's recommended listings.
    RecommendWrite,
    /// See a shop's description, messages and sections, even if not public.
    ShopsRead,
    /// Update a shop's description, messages and sections.
    ShopsWrite,
    /// Read a member's purchase and sales data.
    TransactionsRead,
    /// Update a member's sales data.
    TransactionsWrite,
}

impl Scope {
    pub const ALL: [Scope; 20] = [
        Scope::AddressRead,
        Scope::AddressWrite,
        Scope::BillingRead,
        Scope::CartRead,
        Scope::CartWrite,
        Scope::EmailRead,
        Scope::FavoritesRead,
        Scope::FavoritesWrite,
        Scope::FeedbackRead,
        Scope::ListingsDelete,
        Scope::ListingsRead,
        Scope::ListingsWrite,
        Scope::ProfileRead,
        Scope::ProfileWrite,
        Scope::RecommendRead,
        Scope::RecommendWrite,
        Scope::ShopsRead,
        Scope::ShopsWrite,
        Scope::TransactionsRead,
        Scope::TransactionsWrite,
    ];

    /// Wire identifier sent in the `scope` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::AddressRead => "address_r",
            Scope::AddressWrite => "address_w",
            Scope::BillingRead => "billing_r",
            Scope::CartRead => "cart_r",
            Scope::CartWrite => "cart_w",
            Scope::EmailRead => "email_r",
            Scope::FavoritesRead => "favorites_r",
            Scope::FavoritesWrite => "favorites_w",
            Scope::FeedbackRead => "feedback_r",
            Scope::ListingsDelete => "listings_d",
            Scope::ListingsRead => "listings_r",
            Scope::ListingsWrite => "listings_w",
            Scope::ProfileRead => "profile_r",
            Scope::ProfileWrite => "profile_w",
            Scope::RecommendRead => "recommend_r",
            Scope::RecommendWrite => "recommend_w",
            Scope::ShopsRead => "shops_r",
            Scope::ShopsWrite => "shops_w",
            Scope::TransactionsRead => "transactions_r",
            Scope::TransactionsWrite => "transactions_w",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown scope: {s}")))
    }
}

impl TryFrom<String> for Scope {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Space-join scopes for the authorization URL.
pub fn join_scopes(scopes: &[Scope]) -> String {
    scopes
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
