//! A thin client for a Stripe-compatible checkout API.
//!
//! The server never handles card details itself. It creates a checkout session with the gateway, sends the
//! client to the gateway's hosted page, and learns the outcome either by polling the session (the `confirm`
//! endpoint) or through the signed webhook. The order id travels as the session's `client_reference_id`.

use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Deserialize;
use smartq_engine::db_types::OrderId;
use sq_common::Money;
use thiserror::Error;

use crate::config::PaymentConfig;

#[derive(Debug, Clone, Error)]
pub enum PaymentProviderError {
    #[error("The payment gateway is not configured")]
    NotConfigured,
    #[error("Could not initialize the gateway client. {0}")]
    Initialization(String),
    #[error("Gateway request failed. {0}")]
    RequestError(String),
    #[error("Gateway returned an error. status: {status}, message: {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not parse the gateway response. {0}")]
    JsonError(String),
}

/// A checkout session at the gateway. The client is redirected to `redirect_url` to pay.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

/// The state of a checkout session as reported by the gateway.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub paid: bool,
    pub order_id: Option<OrderId>,
}

/// The gateway operations the payment routes need. Endpoint tests substitute a mock.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider: Clone {
    /// Whether the gateway has credentials. When false, session endpoints answer 503.
    fn is_configured(&self) -> bool;

    async fn create_checkout_session(
        &self,
        order_id: &OrderId,
        amount: Money,
        success_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> Result<CheckoutSession, PaymentProviderError>;

    async fn fetch_session(&self, session_id: &str) -> Result<SessionState, PaymentProviderError>;
}

#[derive(Clone)]
pub struct StripeGateway {
    base_url: String,
    configured: bool,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentProviderError> {
        let secret = config.api_secret.reveal();
        let configured = !secret.is_empty();
        let mut headers = HeaderMap::with_capacity(1);
        if configured {
            let val = HeaderValue::from_str(&format!("Bearer {secret}"))
                .map_err(|e| PaymentProviderError::Initialization(e.to_string()))?;
            headers.insert("Authorization", val);
        }
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| {
                PaymentProviderError::Initialization(e.to_string())
            })?;
        Ok(Self { base_url: config.api_url.clone(), configured, client: Arc::new(client) })
    }

    async fn post_form(&self, path: &str, params: &[(&str, &str)]) -> Result<SessionObject, PaymentProviderError> {
        let url = format!("{}{path}", self.base_url);
        trace!("💳️ POST {url}");
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| PaymentProviderError::RequestError(e.to_string()))?;
        Self::parse_response(response).await
    }

    async fn get(&self, path: &str) -> Result<SessionObject, PaymentProviderError> {
        let url = format!("{}{path}", self.base_url);
        trace!("💳️ GET {url}");
        let response =
            self.client.get(url).send().await.map_err(|e| PaymentProviderError::RequestError(e.to_string()))?;
        Self::parse_response(response).await
    }

    async fn parse_response(response: reqwest::Response) -> Result<SessionObject, PaymentProviderError> {
        if response.status().is_success() {
            response.json::<SessionObject>().await.map_err(|e| PaymentProviderError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaymentProviderError::RequestError(e.to_string()))?;
            Err(PaymentProviderError::QueryError { status, message })
        }
    }
}

impl PaymentProvider for StripeGateway {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_checkout_session(
        &self,
        order_id: &OrderId,
        amount: Money,
        success_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        if !self.configured {
            return Err(PaymentProviderError::NotConfigured);
        }
        let amount_cents = amount.value().to_string();
        let mut params = vec![
            ("mode", "payment"),
            ("client_reference_id", order_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", sq_common::CURRENCY_CODE_LOWER),
            ("line_items[0][price_data][unit_amount]", amount_cents.as_str()),
            ("line_items[0][price_data][product_data][name]", "SmartQ order"),
        ];
        if let Some(url) = success_url {
            params.push(("success_url", url));
        }
        if let Some(url) = cancel_url {
            params.push(("cancel_url", url));
        }
        let session = self.post_form("/checkout/sessions", &params).await?;
        debug!("💳️ Checkout session {} created for order {order_id}", session.id);
        let redirect_url = session.url.unwrap_or_default();
        Ok(CheckoutSession { session_id: session.id, redirect_url })
    }

    async fn fetch_session(&self, session_id: &str) -> Result<SessionState, PaymentProviderError> {
        if !self.configured {
            return Err(PaymentProviderError::NotConfigured);
        }
        let session = self.get(&format!("/checkout/sessions/{session_id}")).await?;
        let paid = session.payment_status.as_deref() == Some("paid");
        let order_id = session.client_reference_id.map(OrderId::from);
        Ok(SessionState { paid, order_id })
    }
}
