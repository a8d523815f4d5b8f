//! Shop listing operations
//!
//! Reads take optional query parameters; writes send form-encoded bodies.
//! Decoding is lenient: fields missing from a response take their defaults.

use serde::{Deserialize, Serialize};
use transport::Method;

use crate::client::EtsyClient;
use crate::error::{Error, Result};
use crate::params::{Params, ToParams};

/// A price as an integer amount over a divisor (`1250 / 100 USD`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Money {
    pub amount: i64,
    pub divisor: i64,
    pub currency_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Listing {
    pub listing_id: i64,
    pub user_id: i64,
    pub shop_id: i64,
    pub title: String,
    pub description: String,
    /// `active`, `inactive`, `sold_out`, `draft` or `expired`
    pub state: String,
    pub creation_tsz: i64,
    pub ending_tsz: i64,
    pub original_creation_tsz: i64,
    pub last_modified_tsz: i64,
    pub price: Money,
    pub quantity: i64,
    pub tags: Vec<String>,
    pub materials: Vec<String>,
    pub shop_section_id: Option<i64>,
    pub featured_rank: i64,
    pub url: String,
    pub views: i64,
    pub num_favorers: i64,
    /// `i_did`, `someone_else` or `collective`
    pub who_made: Option<String>,
    pub when_made: Option<String>,
    pub is_customizable: bool,
    pub is_personalizable: bool,
    pub is_private: bool,
    pub style: Vec<String>,
    pub file_data: String,
    pub has_variations: bool,
    pub should_auto_renew: bool,
    pub language: Option<String>,
    pub sku: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingsResponse {
    pub count: i64,
    pub results: Vec<Listing>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingImage {
    pub listing_id: i64,
    pub listing_image_id: i64,
    pub hex_code: Option<String>,
    pub red: Option<i64>,
    pub green: Option<i64>,
    pub blue: Option<i64>,
    pub hue: Option<i64>,
    pub saturation: Option<i64>,
    pub brightness: Option<i64>,
    pub is_black_and_white: Option<bool>,
    pub creation_tsz: i64,
    pub rank: i64,
    pub url_75x75: String,
    pub url_170x135: String,
    #[serde(rename = "url_570xN")]
    pub url_570x_n: String,
    pub url_fullxfull: String,
    pub full_height: Option<i64>,
    pub full_width: Option<i64>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingImagesResponse {
    pub count: i64,
    pub results: Vec<ListingImage>,
}

/// Form body for `create_draft_listing`. The first seven fields are required
/// by Etsy; everything else is sent only when set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateDraftListingRequest {
    pub quantity: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub who_made: String,
    pub when_made: String,
    pub taxonomy_id: i64,
    pub shipping_profile_id: Option<i64>,
    pub return_policy_id: Option<i64>,
    pub materials: Vec<String>,
    pub shop_section_id: Option<i64>,
    pub processing_min: Option<i64>,
    pub processing_max: Option<i64>,
    pub tags: Vec<String>,
    pub styles: Vec<String>,
    pub item_weight: Option<f64>,
    pub item_length: Option<f64>,
    pub item_width: Option<f64>,
    pub item_height: Option<f64>,
    pub item_weight_unit: Option<String>,
    pub item_dimensions_unit: Option<String>,
    pub is_personalizable: Option<bool>,
    pub personalization_is_required: Option<bool>,
    pub personalization_char_count_limit: Option<i64>,
    pub personalization_instructions: Option<String>,
    pub production_partner_ids: Vec<i64>,
    pub image_ids: Vec<i64>,
    pub is_supply: Option<bool>,
    pub is_customizable: Option<bool>,
    pub should_auto_renew: Option<bool>,
    pub is_taxable: Option<bool>,
    /// `physical` or `download`
    pub listing_type: Option<String>,
}

impl ToParams for CreateDraftListingRequest {
    fn to_params(&self) -> Params {
        Params::new()
            .push("quantity", self.quantity)
            .push("title", &self.title)
            .push("description", &self.description)
            .push("price", self.price)
            .push("who_made", &self.who_made)
            .push("when_made", &self.when_made)
            .push("taxonomy_id", self.taxonomy_id)
            .push_opt("shipping_profile_id", self.shipping_profile_id)
            .push_opt("return_policy_id", self.return_policy_id)
            .push_each("materials", &self.materials)
            .push_opt("shop_section_id", self.shop_section_id)
            .push_opt("processing_min", self.processing_min)
            .push_opt("processing_max", self.processing_max)
            .push_each("tags", &self.tags)
            .push_each("styles", &self.styles)
            .push_opt("item_weight", self.item_weight)
            .push_opt("item_length", self.item_length)
            .push_opt("item_width", self.item_width)
            .push_opt("item_height", self.item_height)
            .push_opt("item_weight_unit", self.item_weight_unit.as_deref())
            .push_opt("item_dimensions_unit", self.item_dimensions_unit.as_deref())
            .push_opt("is_personalizable", self.is_personalizable)
            .push_opt(
                "personalization_is_required",
                self.personalization_is_required,
            )
            .push_opt(
                "personalization_char_count_limit",
                self.personalization_char_count_limit,
            )
            .push_opt(
                "personalization_instructions",
                self.personalization_instructions.as_deref(),
            )
            .push_each("production_partner_ids", &self.production_partner_ids)
            .push_each("image_ids", &self.image_ids)
            .push_opt("is_supply", self.is_supply)
            .push_opt("is_customizable", self.is_customizable)
            .push_opt("should_auto_renew", self.should_auto_renew)
            .push_opt("is_taxable", self.is_taxable)
            .push_opt("type", self.listing_type.as_deref())
    }
}

/// Form body for `update_listing`. Only set fields are sent, so unset fields
/// keep their current value on Etsy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub materials: Vec<String>,
    pub should_auto_renew: Option<bool>,
    pub shipping_profile_id: Option<i64>,
    pub return_policy_id: Option<i64>,
    pub shop_section_id: Option<i64>,
    pub item_weight: Option<f64>,
    pub item_length: Option<f64>,
    pub item_width: Option<f64>,
    pub item_height: Option<f64>,
    pub item_weight_unit: Option<String>,
    pub item_dimensions_unit: Option<String>,
    pub tags: Vec<String>,
    pub who_made: Option<String>,
    pub when_made: Option<String>,
    pub taxonomy_id: Option<i64>,
    pub styles: Vec<String>,
    pub processing_min: Option<i64>,
    pub processing_max: Option<i64>,
    /// `active`, `inactive` or `draft`
    pub state: Option<String>,
    pub featured_rank: Option<i64>,
    pub is_personalizable: Option<bool>,
    pub personalization_is_required: Option<bool>,
    pub personalization_char_count_limit: Option<i64>,
    pub personalization_instructions: Option<String>,
    pub is_supply: Option<bool>,
    pub is_customizable: Option<bool>,
    pub is_taxable: Option<bool>,
}

impl ToParams for UpdateListingRequest {
    fn to_params(&self) -> Params {
        Params::new()
            .push_opt("title", self.title.as_deref())
            .push_opt("description", self.description.as_deref())
            .push_each("materials", &self.materials)
            .push_opt("should_auto_renew", self.should_auto_renew)
            .push_opt("shipping_profile_id", self.shipping_profile_id)
            .push_opt("return_policy_id", self.return_policy_id)
            .push_opt("shop_section_id", self.shop_section_id)
            .push_opt("item_weight", self.item_weight)
            .push_opt("item_length", self.item_length)
            .push_opt("item_width", self.item_width)
            .push_opt("item_height", self.item_height)
            .push_opt("item_weight_unit", self.item_weight_unit.as_deref())
            .push_opt("item_dimensions_unit", self.item_dimensions_unit.as_deref())
            .push_each("tags", &self.tags)
            .push_opt("who_made", self.who_made.as_deref())
            .push_opt("when_made", self.when_made.as_deref())
            .push_opt("taxonomy_id", self.taxonomy_id)
            .push_each("styles", &self.styles)
            .push_opt("processing_min", self.processing_min)
            .push_opt("processing_max", self.processing_max)
            .push_opt("state", self.state.as_deref())
            .push_opt("featured_rank", self.featured_rank)
            .push_opt("is_personalizable", self.is_personalizable)
            .push_opt(
                "personalization_is_required",
                self.personalization_is_required,
            )
            .push_opt(
                "personalization_char_count_limit",
                self.personalization_char_count_limit,
            )
            .push_opt(
                "personalization_instructions",
                self.personalization_instructions.as_deref(),
            )
            .push_opt("is_supply", self.is_supply)
            .push_opt("is_customizable", self.is_customizable)
            .push_opt("is_taxable", self.is_taxable)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetListingParams {
    pub includes: Vec<String>,
    pub language: Option<String>,
}

impl ToParams for GetListingParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_comma("includes", &self.includes)
            .push_opt("language", self.language.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetListingsByShopParams {
    /// `active`, `inactive`, `draft`, `expired` or `sold_out`
    pub state: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// `created`, `price`, `updated` or `score`
    pub sort_on: Option<String>,
    pub sort_order: Option<String>,
    pub includes: Vec<String>,
    pub keywords: Option<String>,
    pub language: Option<String>,
}

impl ToParams for GetListingsByShopParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_opt("state", self.state.as_deref())
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_opt("sort_on", self.sort_on.as_deref())
            .push_opt("sort_order", self.sort_order.as_deref())
            .push_comma("includes", &self.includes)
            .push_opt("keywords", self.keywords.as_deref())
            .push_opt("language", self.language.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindAllActiveListingsByShopParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub keywords: Option<String>,
    pub sort_on: Option<String>,
    pub sort_order: Option<String>,
    pub includes: Vec<String>,
    pub language: Option<String>,
}

impl ToParams for FindAllActiveListingsByShopParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_opt("keywords", self.keywords.as_deref())
            .push_opt("sort_on", self.sort_on.as_deref())
            .push_opt("sort_order", self.sort_order.as_deref())
            .push_comma("includes", &self.includes)
            .push_opt("language", self.language.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindAllListingsActiveParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub keywords: Option<String>,
    pub sort_on: Option<String>,
    pub sort_order: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub taxonomy_id: Option<i64>,
    pub shop_location: Option<String>,
    pub includes: Vec<String>,
}

impl ToParams for FindAllListingsActiveParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_opt("keywords", self.keywords.as_deref())
            .push_opt("sort_on", self.sort_on.as_deref())
            .push_opt("sort_order", self.sort_order.as_deref())
            .push_opt("min_price", self.min_price)
            .push_opt("max_price", self.max_price)
            .push_opt("taxonomy_id", self.taxonomy_id)
            .push_opt("shop_location", self.shop_location.as_deref())
            .push_comma("includes", &self.includes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetListingsByListingIdsParams {
    /// Required, at least one id
    pub listing_ids: Vec<i64>,
    pub includes: Vec<String>,
}

impl ToParams for GetListingsByListingIdsParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_comma("listing_ids", &self.listing_ids)
            .push_comma("includes", &self.includes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetListingsByShopSectionIdParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_on: Option<String>,
    pub sort_order: Option<String>,
    pub includes: Vec<String>,
}

impl ToParams for GetListingsByShopSectionIdParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_opt("sort_on", self.sort_on.as_deref())
            .push_opt("sort_order", self.sort_order.as_deref())
            .push_comma("includes", &self.includes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetListingsByShopReceiptParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub includes: Vec<String>,
}

impl ToParams for GetListingsByShopReceiptParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_comma("includes", &self.includes)
    }
}

impl EtsyClient {
    pub async fn create_draft_listing(
        &self,
        shop_id: i64,
        body: &CreateDraftListingRequest,
    ) -> Result<Listing> {
        let path = format!("/v3/application/shops/{shop_id}/listings");
        let request = self.with_form(Method::POST, &path, body)?;
        self.send("create_draft_listing", request).await
    }

    pub async fn get_listing(&self, listing_id: i64, params: &GetListingParams) -> Result<Listing> {
        let path = format!("/v3/application/listings/{listing_id}");
        let request = self.get(&path, params)?;
        self.send("get_listing", request).await
    }

    pub async fn update_listing(
        &self,
        shop_id: i64,
        listing_id: i64,
        body: &UpdateListingRequest,
    ) -> Result<Listing> {
        let path = format!("/v3/application/shops/{shop_id}/listings/{listing_id}");
        let request = self.with_form(Method::PATCH, &path, body)?;
        self.send("update_listing", request).await
    }

    /// Delete a listing. Etsy answers with an empty body, which is ignored.
    pub async fn delete_listing(&self, listing_id: i64) -> Result<()> {
        let path = format!("/v3/application/listings/{listing_id}");
        let request = self.request(Method::DELETE, &path)?;
        self.dispatch("delete_listing", request).await.map(drop)
    }

    pub async fn get_listings_by_shop(
        &self,
        shop_id: i64,
        params: &GetListingsByShopParams,
    ) -> Result<ListingsResponse> {
        let path = format!("/v3/application/shops/{shop_id}/listings");
        let request = self.get(&path, params)?;
        self.send("get_listings_by_shop", request).await
    }

    pub async fn find_all_active_listings_by_shop(
        &self,
        shop_id: i64,
        params: &FindAllActiveListingsByShopParams,
    ) -> Result<ListingsResponse> {
        let path = format!("/v3/application/shops/{shop_id}/listings/active");
        let request = self.get(&path, params)?;
        self.send("find_all_active_listings_by_shop", request).await
    }

    pub async fn find_all_listings_active(
        &self,
        params: &FindAllListingsActiveParams,
    ) -> Result<ListingsResponse> {
        let request = self.get("/v3/application/listings/active", params)?;
        self.send("find_all_listings_active", request).await
    }

    /// Fetch listings by id. Fails without a request when `listing_ids` is empty.
    pub async fn get_listings_by_listing_ids(
        &self,
        params: &GetListingsByListingIdsParams,
    ) -> Result<ListingsResponse> {
        if params.listing_ids.is_empty() {
            return Err(Error::InvalidRequest("listing_ids must not be empty".into()));
        }
        let request = self.get("/v3/application/listings/batch", params)?;
        self.send("get_listings_by_listing_ids", request).await
    }

    pub async fn get_listings_by_shop_section_id(
        &self,
        shop_id: i64,
        shop_section_id: i64,
        params: &GetListingsByShopSectionIdParams,
    ) -> Result<ListingsResponse> {
        let path =
            format!("/v3/application/shops/{shop_id}/shop-sections/{shop_section_id}/listings");
        let request = self.get(&path, params)?;
        self.send("get_listings_by_shop_section_id", request).await
    }

    pub async fn get_listings_by_shop_receipt(
        &self,
        shop_id: i64,
        receipt_id: i64,
        params: &GetListingsByShopReceiptParams,
    ) -> Result<ListingsResponse> {
        let path = format!("/v3/application/shops/{shop_id}/receipts/{receipt_id}/listings");
        let request = self.get(&path, params)?;
        self.send("get_listings_by_shop_receipt", request).await
    }

    pub async fn get_listing_images(&self, listing_id: i64) -> Result<ListingImagesResponse> {
        let path = format!("/v3/application/listings/{listing_id}/images");
        let request = self.get(&path, &Params::new())?;
        self.send("get_listing_images", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{api_request, scripted_client, token_json};
    use std::sync::Arc;
    use transport::{HttpRequest, ScriptedTransport, header};

    fn listing_json(id: i64) -> serde_json::Value {
        serde_json::json!({
            "listing_id": id,
            "shop_id": 42,
            "title": "Oak bowl",
            "state": "active",
            "price": {"amount": 2500, "divisor": 100, "currency_code": "EUR"},
            "quantity": 3,
            "tags": ["oak", "bowl"],
            "shop_section_id": null,
            "who_made": "i_did"
        })
    }

    fn scripted(responses: &[serde_json::Value]) -> Arc<ScriptedTransport> {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        for response in responses {
            transport.push_json(200, response.clone());
        }
        transport
    }

    fn form(request: &HttpRequest) -> String {
        request.body_text().unwrap()
    }

    #[test]
    fn listing_decodes_leniently() {
        let listing: Listing = serde_json::from_value(listing_json(7)).unwrap();
        assert_eq!(listing.listing_id, 7);
        assert_eq!(listing.price.amount, 2500);
        assert_eq!(listing.price.currency_code, "EUR");
        assert_eq!(listing.tags, vec!["oak", "bowl"]);
        assert_eq!(listing.shop_section_id, None);
        assert_eq!(listing.who_made.as_deref(), Some("i_did"));
        // Absent from the payload
        assert_eq!(listing.views, 0);
        assert!(listing.materials.is_empty());
    }

    #[test]
    fn image_field_names_match_api() {
        let image: ListingImage = serde_json::from_value(serde_json::json!({
            "listing_image_id": 9,
            "url_570xN": "https://img.test/570.jpg",
            "url_fullxfull": "https://img.test/full.jpg",
            "hex_code": null
        }))
        .unwrap();
        assert_eq!(image.listing_image_id, 9);
        assert_eq!(image.url_570x_n, "https://img.test/570.jpg");
        assert_eq!(image.url_fullxfull, "https://img.test/full.jpg");
        assert_eq!(image.hex_code, None);
    }

    #[tokio::test]
    async fn get_listing_encodes_comma_includes() {
        let transport = scripted(&[listing_json(7)]);
        let client = scripted_client(transport.clone());

        let params = GetListingParams {
            includes: vec!["Images".into(), "Shop".into()],
            language: Some("de".into()),
        };
        let listing = client.get_listing(7, &params).await.unwrap();
        assert_eq!(listing.title, "Oak bowl");

        let sent = api_request(&transport);
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url.path(), "/v3/application/listings/7");
        assert_eq!(sent.url.query(), Some("includes=Images%2CShop&language=de"));
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn create_draft_listing_posts_form() {
        let transport = scripted(&[listing_json(100)]);
        let client = scripted_client(transport.clone());

        let body = CreateDraftListingRequest {
            quantity: 3,
            title: "Oak bowl".into(),
            description: "Hand turned".into(),
            price: 25.0,
            who_made: "i_did".into(),
            when_made: "made_to_order".into(),
            taxonomy_id: 1234,
            tags: vec!["oak".into(), "bowl".into()],
            is_supply: Some(false),
            ..Default::default()
        };
        let listing = client.create_draft_listing(42, &body).await.unwrap();
        assert_eq!(listing.listing_id, 100);

        let sent = api_request(&transport);
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url.path(), "/v3/application/shops/42/listings");
        assert_eq!(
            sent.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            form(&sent),
            "quantity=3&title=Oak+bowl&description=Hand+turned&price=25&who_made=i_did\
             &when_made=made_to_order&taxonomy_id=1234&tags=oak&tags=bowl&is_supply=false"
        );
    }

    #[tokio::test]
    async fn update_listing_sends_only_set_fields() {
        let transport = scripted(&[listing_json(7)]);
        let client = scripted_client(transport.clone());

        let body = UpdateListingRequest {
            title: Some("Walnut bowl".into()),
            state: Some("inactive".into()),
            ..Default::default()
        };
        client.update_listing(42, 7, &body).await.unwrap();

        let sent = api_request(&transport);
        assert_eq!(sent.method, Method::PATCH);
        assert_eq!(sent.url.path(), "/v3/application/shops/42/listings/7");
        assert_eq!(form(&sent), "title=Walnut+bowl&state=inactive");
    }

    #[tokio::test]
    async fn delete_listing_ignores_empty_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        transport.push_response(204, "");
        let client = scripted_client(transport.clone());

        client.delete_listing(7).await.unwrap();
        let sent = api_request(&transport);
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.url.path(), "/v3/application/listings/7");
    }

    #[tokio::test]
    async fn collection_paths_and_queries() {
        let page = serde_json::json!({"count": 1, "results": [listing_json(1)]});
        let transport = scripted(&[
            page.clone(),
            page.clone(),
            page.clone(),
            page.clone(),
            page.clone(),
            page.clone(),
        ]);
        let client = scripted_client(transport.clone());

        let by_shop = client
            .get_listings_by_shop(
                42,
                &GetListingsByShopParams {
                    state: Some("draft".into()),
                    limit: Some(25),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_shop.count, 1);
        assert_eq!(by_shop.results[0].listing_id, 1);

        client
            .find_all_active_listings_by_shop(
                42,
                &FindAllActiveListingsByShopParams {
                    keywords: Some("oak bowl".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        client
            .find_all_listings_active(&FindAllListingsActiveParams {
                min_price: Some(10.5),
                taxonomy_id: Some(7),
                ..Default::default()
            })
            .await
            .unwrap();
        client
            .get_listings_by_listing_ids(&GetListingsByListingIdsParams {
                listing_ids: vec![1, 2, 3],
                includes: vec![],
            })
            .await
            .unwrap();
        client
            .get_listings_by_shop_section_id(42, 5, &Default::default())
            .await
            .unwrap();
        client
            .get_listings_by_shop_receipt(
                42,
                900,
                &GetListingsByShopReceiptParams {
                    offset: Some(50),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let sent: Vec<(String, Option<String>)> = transport.requests()[1..]
            .iter()
            .map(|r| (r.url.path().to_string(), r.url.query().map(str::to_owned)))
            .collect();
        let expected = [
            ("/v3/application/shops/42/listings", Some("state=draft&limit=25")),
            ("/v3/application/shops/42/listings/active", Some("keywords=oak+bowl")),
            ("/v3/application/listings/active", Some("min_price=10.5&taxonomy_id=7")),
            ("/v3/application/listings/batch", Some("listing_ids=1%2C2%2C3")),
            ("/v3/application/shops/42/shop-sections/5/listings", None),
            ("/v3/application/shops/42/receipts/900/listings", Some("offset=50")),
        ];
        assert_eq!(sent.len(), expected.len());
        for ((path, query), (want_path, want_query)) in sent.iter().zip(expected) {
            assert_eq!(path, want_path);
            assert_eq!(query.as_deref(), want_query);
        }
    }

    #[tokio::test]
    async fn batch_without_ids_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = scripted_client(transport.clone());

        let err = client
            .get_listings_by_listing_ids(&GetListingsByListingIdsParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn listing_images() {
        let transport = scripted(&[serde_json::json!({
            "count": 2,
            "results": [
                {"listing_id": 7, "listing_image_id": 1, "rank": 1},
                {"listing_id": 7, "listing_image_id": 2, "rank": 2}
            ]
        })]);
        let client = scripted_client(transport.clone());

        let images = client.get_listing_images(7).await.unwrap();
        assert_eq!(images.count, 2);
        assert_eq!(images.results[1].listing_image_id, 2);
        assert_eq!(
            api_request(&transport).url.path(),
            "/v3/application/listings/7/images"
        );
    }

    #[tokio::test]
    async fn not_found_is_api_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        transport.push_response(404, r#"{"error":"Listing not found"}"#);
        let client = scripted_client(transport);

        let err = client
            .get_listing(1, &GetListingParams::default())
            .await
            .unwrap_err();
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Listing not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
