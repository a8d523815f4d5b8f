//! Shop receipt operations

use serde::{Deserialize, Serialize};
use transport::Method;

use crate::client::EtsyClient;
use crate::error::Result;
use crate::listing::Money;
use crate::params::{Params, ToParams};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptShipment {
    pub receipt_shipping_id: Option<i64>,
    pub shipment_notification_timestamp: i64,
    pub carrier_name: String,
    pub tracking_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionVariation {
    pub property_id: i64,
    pub value_id: Option<i64>,
    pub formatted_name: String,
    pub formatted_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionProductData {
    pub property_id: i64,
    pub property_name: String,
    pub scale_id: Option<i64>,
    pub scale_name: Option<String>,
    pub value_ids: Vec<i64>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptTransaction {
    pub transaction_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub seller_user_id: i64,
    pub buyer_user_id: i64,
    pub create_timestamp: i64,
    pub created_timestamp: i64,
    pub paid_timestamp: Option<i64>,
    pub shipped_timestamp: Option<i64>,
    pub quantity: i64,
    pub listing_image_id: Option<i64>,
    pub receipt_id: i64,
    pub is_digital: bool,
    pub file_data: String,
    pub listing_id: Option<i64>,
    pub transaction_type: String,
    pub product_id: Option<i64>,
    pub sku: Option<String>,
    pub price: Money,
    pub shipping_cost: Money,
    pub variations: Vec<TransactionVariation>,
    pub product_data: Vec<TransactionProductData>,
    pub shipping_profile_id: Option<i64>,
    pub min_processing_days: Option<i64>,
    pub max_processing_days: Option<i64>,
    pub shipping_method: Option<String>,
    pub shipping_upgrade: Option<String>,
    pub expected_ship_date: Option<i64>,
    pub buyer_coupon: f64,
    pub shop_coupon: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptRefund {
    pub amount: Money,
    pub created_timestamp: i64,
    pub reason: Option<String>,
    pub note_from_issuer: Option<String>,
    pub status: Option<String>,
}

/// A buyer's order with its transactions, shipments and refunds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receipt {
    pub receipt_id: i64,
    pub receipt_type: i64,
    pub seller_user_id: i64,
    pub seller_email: Option<String>,
    pub buyer_user_id: i64,
    pub buyer_email: Option<String>,
    pub name: String,
    pub first_line: String,
    pub second_line: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub zip: String,
    pub status: String,
    pub formatted_address: String,
    pub country_iso: String,
    pub payment_method: String,
    pub payment_email: Option<String>,
    pub message_from_seller: Option<String>,
    pub message_from_buyer: Option<String>,
    pub message_from_payment: Option<String>,
    pub is_paid: bool,
    pub is_shipped: bool,
    pub create_timestamp: i64,
    pub created_timestamp: i64,
    pub update_timestamp: i64,
    pub updated_timestamp: i64,
    pub is_gift: bool,
    pub gift_message: String,
    pub gift_sender: String,
    #[serde(rename = "grandtotal")]
    pub grand_total: Money,
    pub subtotal: Money,
    pub total_price: Money,
    pub total_shipping_cost: Money,
    pub total_tax_cost: Money,
    pub total_vat_cost: Money,
    pub discount_amt: Money,
    pub gift_wrap_price: Money,
    pub shipments: Vec<ReceiptShipment>,
    pub transactions: Vec<ReceiptTransaction>,
    pub refunds: Vec<ReceiptRefund>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptListResponse {
    pub count: i64,
    pub results: Vec<Receipt>,
}

/// Filters for `get_shop_receipts`. Timestamps are unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetShopReceiptsParams {
    pub min_created: Option<i64>,
    pub max_created: Option<i64>,
    pub min_last_modified: Option<i64>,
    pub max_last_modified: Option<i64>,
    /// 1 to 100, Etsy defaults to 25
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// `created`, `updated` or `receipt_id`
    pub sort_on: Option<String>,
    /// `asc` or `desc` (and their long forms)
    pub sort_order: Option<String>,
    pub was_paid: Option<bool>,
    pub was_shipped: Option<bool>,
    pub was_delivered: Option<bool>,
    pub was_canceled: Option<bool>,
    pub legacy: Option<bool>,
}

impl ToParams for GetShopReceiptsParams {
    fn to_params(&self) -> Params {
        Params::new()
            .push_opt("min_created", self.min_created)
            .push_opt("max_created", self.max_created)
            .push_opt("min_last_modified", self.min_last_modified)
            .push_opt("max_last_modified", self.max_last_modified)
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_opt("sort_on", self.sort_on.as_deref())
            .push_opt("sort_order", self.sort_order.as_deref())
            .push_opt("was_paid", self.was_paid)
            .push_opt("was_shipped", self.was_shipped)
            .push_opt("was_delivered", self.was_delivered)
            .push_opt("was_canceled", self.was_canceled)
            .push_opt("legacy", self.legacy)
    }
}

/// Form body for `update_shop_receipt`. `None` leaves a status unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateShopReceiptBody {
    pub legacy: bool,
    pub was_shipped: Option<bool>,
    pub was_paid: Option<bool>,
}

impl ToParams for UpdateShopReceiptBody {
    fn to_params(&self) -> Params {
        Params::new()
            .push("legacy", self.legacy)
            .push_opt("was_shipped", self.was_shipped)
            .push_opt("was_paid", self.was_paid)
    }
}

/// Form body for `create_receipt_shipment`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateReceiptShipmentBody {
    pub legacy: bool,
    pub tracking_code: String,
    pub carrier_name: String,
    /// Also send the shipping notification to the seller
    pub send_bcc: bool,
    pub note_to_buyer: String,
}

impl ToParams for CreateReceiptShipmentBody {
    fn to_params(&self) -> Params {
        Params::new()
            .push("legacy", self.legacy)
            .push("tracking_code", &self.tracking_code)
            .push("carrier_name", &self.carrier_name)
            .push("send_bcc", self.send_bcc)
            .push("note_to_buyer", &self.note_to_buyer)
    }
}

impl EtsyClient {
    pub async fn get_shop_receipts(
        &self,
        shop_id: i64,
        params: &GetShopReceiptsParams,
    ) -> Result<ReceiptListResponse> {
        let path = format!("/v3/application/shops/{shop_id}/receipts");
        let request = self.get(&path, params)?;
        self.send("get_shop_receipts", request).await
    }

    pub async fn get_shop_receipt(&self, shop_id: i64, receipt_id: i64) -> Result<Receipt> {
        let path = format!("/v3/application/shops/{shop_id}/receipts/{receipt_id}");
        let request = self.get(&path, &Params::new())?;
        self.send("get_shop_receipt", request).await
    }

    pub async fn update_shop_receipt(
        &self,
        shop_id: i64,
        receipt_id: i64,
        body: &UpdateShopReceiptBody,
    ) -> Result<Receipt> {
        let path = format!("/v3/application/shops/{shop_id}/receipts/{receipt_id}");
        let request = self.with_form(Method::PUT, &path, body)?;
        self.send("update_shop_receipt", request).await
    }

    /// Add tracking to a receipt and notify the buyer.
    pub async fn create_receipt_shipment(
        &self,
        shop_id: i64,
        receipt_id: i64,
        body: &CreateReceiptShipmentBody,
    ) -> Result<Receipt> {
        let path = format!("/v3/application/shops/{shop_id}/receipts/{receipt_id}/tracking");
        let request = self.with_form(Method::POST, &path, body)?;
        self.send("create_receipt_shipment", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{api_request, scripted_client, token_json};
    use crate::error::Error;
    use std::sync::Arc;
    use transport::{ScriptedTransport, header};

    fn receipt_json() -> serde_json::Value {
        serde_json::json!({
            "receipt_id": 900,
            "receipt_type": 0,
            "buyer_email": null,
            "name": "Ada Lovelace",
            "status": "Paid",
            "is_paid": true,
            "is_shipped": false,
            "grandtotal": {"amount": 3150, "divisor": 100, "currency_code": "EUR"},
            "shipments": [
                {"receipt_shipping_id": null, "carrier_name": "dhl", "tracking_code": "JJD01"}
            ],
            "transactions": [{
                "transaction_id": 1,
                "quantity": 2,
                "price": {"amount": 1250, "divisor": 100, "currency_code": "EUR"},
                "variations": [{"property_id": 200, "value_id": null,
                                "formatted_name": "Size", "formatted_value": "L"}],
                "buyer_coupon": 0.0
            }],
            "refunds": []
        })
    }

    fn scripted(status: u16, body: serde_json::Value) -> Arc<ScriptedTransport> {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, token_json());
        transport.push_json(status, body);
        transport
    }

    #[test]
    fn receipt_decodes_nested_and_nullable_fields() {
        let receipt: Receipt = serde_json::from_value(receipt_json()).unwrap();
        assert_eq!(receipt.receipt_id, 900);
        assert_eq!(receipt.buyer_email, None);
        assert_eq!(receipt.grand_total.amount, 3150);
        assert_eq!(receipt.shipments[0].tracking_code, "JJD01");
        assert_eq!(receipt.shipments[0].receipt_shipping_id, None);
        let transaction = &receipt.transactions[0];
        assert_eq!(transaction.quantity, 2);
        assert_eq!(transaction.price.divisor, 100);
        assert_eq!(transaction.variations[0].formatted_value, "L");
        // Absent from the payload
        assert_eq!(receipt.total_tax_cost, Money::default());
    }

    #[tokio::test]
    async fn get_shop_receipts_encodes_filters() {
        let transport = scripted(
            200,
            serde_json::json!({"count": 1, "results": [receipt_json()]}),
        );
        let client = scripted_client(transport.clone());

        let params = GetShopReceiptsParams {
            limit: Some(10),
            was_paid: Some(true),
            was_shipped: Some(false),
            sort_order: Some("desc".into()),
            ..Default::default()
        };
        let page = client.get_shop_receipts(42, &params).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "Ada Lovelace");

        let sent = api_request(&transport);
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url.path(), "/v3/application/shops/42/receipts");
        assert_eq!(
            sent.url.query(),
            Some("limit=10&sort_order=desc&was_paid=true&was_shipped=false")
        );
    }

    #[tokio::test]
    async fn get_shop_receipt_path() {
        let transport = scripted(200, receipt_json());
        let client = scripted_client(transport.clone());

        let receipt = client.get_shop_receipt(42, 900).await.unwrap();
        assert!(receipt.is_paid);

        let sent = api_request(&transport);
        assert_eq!(sent.url.path(), "/v3/application/shops/42/receipts/900");
        assert_eq!(sent.url.query(), None);
    }

    #[tokio::test]
    async fn update_shop_receipt_puts_form() {
        let transport = scripted(200, receipt_json());
        let client = scripted_client(transport.clone());

        let body = UpdateShopReceiptBody {
            legacy: false,
            was_shipped: Some(true),
            was_paid: None,
        };
        client.update_shop_receipt(42, 900, &body).await.unwrap();

        let sent = api_request(&transport);
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.url.path(), "/v3/application/shops/42/receipts/900");
        assert_eq!(
            sent.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            sent.body_text().unwrap(),
            "legacy=false&was_shipped=true"
        );
    }

    #[tokio::test]
    async fn create_receipt_shipment_posts_tracking() {
        let transport = scripted(200, receipt_json());
        let client = scripted_client(transport.clone());

        let body = CreateReceiptShipmentBody {
            tracking_code: "JJD01".into(),
            carrier_name: "dhl".into(),
            note_to_buyer: "Thanks & enjoy".into(),
            ..Default::default()
        };
        let receipt = client.create_receipt_shipment(42, 900, &body).await.unwrap();
        assert_eq!(receipt.shipments.len(), 1);

        let sent = api_request(&transport);
        assert_eq!(sent.method, Method::POST);
        assert_eq!(
            sent.url.path(),
            "/v3/application/shops/42/receipts/900/tracking"
        );
        assert_eq!(
            sent.body_text().unwrap(),
            "legacy=false&tracking_code=JJD01&carrier_name=dhl&send_bcc=false\
             &note_to_buyer=Thanks+%26+enjoy"
        );
    }

    #[tokio::test]
    async fn error_status_wins_over_decodable_body() {
        let transport = scripted(403, receipt_json());
        let client = scripted_client(transport);

        let err = client.get_shop_receipt(42, 900).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 403, .. }), "got {err:?}");
    }
}
