//! Authorized client for the Etsy Open API v3
//!
//! `Authorizer` keeps one access token fresh and stamps it onto requests;
//! `EtsyClient` builds the listing and receipt calls on top of it.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use etsy_auth::TokenAuthority;
//! use etsy_client::{Authorizer, AuthorizerConfig, EtsyClient, GetListingParams};
//! use transport::{HttpTransport, ReqwestTransport};
//!
//! let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::default());
//! let authority = TokenAuthority::pkce("keystring", "https://app.example/cb", transport.clone())?;
//! let authorizer = Authorizer::new(AuthorizerConfig::new("keystring", "refresh-token", Arc::new(authority)))?;
//! let client = EtsyClient::new(transport, Arc::new(authorizer))?;
//! let listing = client.get_listing(123, &GetListingParams::default()).await?;
//! println!("{}", listing.title);
//! # Ok(())
//! # }
//! ```

pub mod authorizer;
pub mod client;
pub mod clock;
pub mod error;
pub mod listing;
pub mod params;
pub mod receipt;

pub use authorizer::{Authorizer, AuthorizerConfig, DEFAULT_SAFETY_MARGIN};
pub use client::{API_KEY_HEADER, DEFAULT_BASE_URL, EtsyClient, default_user_agent};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use listing::{
    CreateDraftListingRequest, FindAllActiveListingsByShopParams, FindAllListingsActiveParams,
    GetListingParams, GetListingsByListingIdsParams, GetListingsByShopParams,
    GetListingsByShopReceiptParams, GetListingsByShopSectionIdParams, Listing, ListingImage,
    ListingImagesResponse, ListingsResponse, Money, UpdateListingRequest,
};
pub use params::{Params, ToParams};
pub use receipt::{
    CreateReceiptShipmentBody, GetShopReceiptsParams, Receipt, ReceiptListResponse,
    ReceiptRefund, ReceiptShipment, ReceiptTransaction, TransactionProductData,
    TransactionVariation, UpdateShopReceiptBody,
};
