use std::fmt::Display;

use serde::{Deserialize, Serialize};
use smartq_engine::{
    db_types::{Order, OrderId, QrPayload, User},
    order_objects::CartItem,
};
use sq_common::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//----------------------------------------------   Auth  ----------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

//----------------------------------------------   Orders  ----------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub vendor_id: String,
    pub items: Vec<CartItem>,
    /// The total the client computed, in major currency units. Verified server-side; never trusted.
    pub total_amount: Money,
}

/// An order plus the QR payload the client renders for pickup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_payload: Option<String>,
}

impl OrderResponse {
    pub fn with_qr(order: Order) -> Self {
        let qr_payload = order.qr_payload().map(|qr| qr.encode());
        Self { order, qr_payload }
    }

    pub fn without_qr(order: Order) -> Self {
        Self { order, qr_payload: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOrderRequest {
    pub order_id: OrderId,
    #[serde(default, rename = "token", alias = "verificationToken")]
    pub verification_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOrderResponse {
    pub order: Order,
    pub newly_confirmed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendQrResponse {
    pub order: Order,
    pub qr_payload: String,
}

impl ResendQrResponse {
    pub fn new(order: Order, qr: QrPayload) -> Self {
        Self { order, qr_payload: qr.encode() }
    }
}

//----------------------------------------------   Payments  --------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub order_id: OrderId,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentResponse {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub order: Order,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub session_id: String,
}

/// A Stripe-style webhook event envelope. Only the fields we dispatch on are modelled; everything else in
/// the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookObject,
}

/// The object nested inside a webhook event. For checkout sessions the order id travels in
/// `client_reference_id`; payment intents carry it in `metadata.order_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookObject {
    pub id: String,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl WebhookObject {
    /// The order this event refers to, if the payload names one.
    pub fn order_id(&self) -> Option<OrderId> {
        if let Some(id) = &self.client_reference_id {
            return Some(OrderId::from(id.clone()));
        }
        self.metadata
            .as_ref()
            .and_then(|m| m.get("order_id"))
            .and_then(|v| v.as_str())
            .map(|s| OrderId::from(s.to_string()))
    }
}
