use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{PaymentError, PaymentResult};

/// Order handle returned by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub order_id: String,
}

/// Upstream payment gateway. Orders are created before checkout; the
/// callback signature is verified locally, so verification never goes
/// back to the gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order at the gateway. `amount_minor` is in the smallest
    /// currency unit (paise for INR).
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> PaymentResult<GatewayOrder>;

    /// Public key id handed to the checkout client.
    fn key_id(&self) -> String;
}

/// Razorpay Orders API client.
#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self::with_base_url(key_id, key_secret, "https://api.razorpay.com".to_string())
    }

    pub fn with_base_url(key_id: String, key_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            key_id,
            key_secret,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self))]
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> PaymentResult<GatewayOrder> {
        let url = format!("{}/v1/orders", self.base_url);
        let body = json!({
            "amount": amount_minor,
            "currency": currency,
            "receipt": receipt,
        });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(format!("Order request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway(format!(
                "Order request returned {}: {}",
                status, detail
            )));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Gateway(format!("Malformed order response: {}", e)))?;

        Ok(GatewayOrder { order_id: order.id })
    }

    fn key_id(&self) -> String {
        self.key_id.clone()
    }
}
