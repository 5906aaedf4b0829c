use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use sq_common::Money;
use thiserror::Error;

/// The floor on estimated preparation time. Even an order of instant items is never promised sooner than this.
pub const MIN_PREPARATION_MINUTES: i64 = 15;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------       OrderId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
/// Order fulfilment status. An order only ever moves forward through the sequence
/// Placed → Confirmed → Preparing → Ready → Completed, or sideways into the terminal Cancelled state from any
/// non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been created; no payment has been received.
    Placed,
    /// The vendor has accepted the order (payment received, or pickup verified).
    Confirmed,
    /// The kitchen is working on the order.
    Preparing,
    /// The order is ready for collection.
    Ready,
    /// The order has been collected. Terminal.
    Completed,
    /// The order was cancelled before completion. Terminal.
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Placed => "PLACED",
            OrderStatusType::Confirmed => "CONFIRMED",
            OrderStatusType::Preparing => "PREPARING",
            OrderStatusType::Ready => "READY",
            OrderStatusType::Completed => "COMPLETED",
            OrderStatusType::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLACED" => Ok(Self::Placed),
            "CONFIRMED" => Ok(Self::Confirmed),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl OrderStatusType {
    /// The next status in the kitchen progression, or `None` for statuses the scheduler never advances.
    /// `Placed` is deliberately excluded: only payment or pickup verification moves an order out of `Placed`.
    pub fn next(&self) -> Option<OrderStatusType> {
        use OrderStatusType::*;
        match self {
            Confirmed => Some(Preparing),
            Preparing => Some(Ready),
            Ready => Some(Completed),
            Placed | Completed | Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Completed | OrderStatusType::Cancelled)
    }

    /// An order can be cancelled from any non-terminal status.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
/// Payment state for an order. `Failed` is retryable: a later successful attempt moves it to `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------       User            -------------------------------------------------------
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 hash of the password. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
}

//--------------------------------------       Vendor          -------------------------------------------------------
/// A food outlet. Static, seeded data: read-only as far as the order flow is concerned.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub rating: f64,
    pub is_open: bool,
    pub open_time: String,
    pub close_time: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      MenuItem         -------------------------------------------------------
/// A menu entry belonging to exactly one vendor. The authoritative source of pricing: client-side prices are never
/// trusted when an order is created.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub preparation_time_minutes: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem        -------------------------------------------------------
/// A single order line, snapshotted from the menu at creation time so that later menu edits never retroactively
/// change a historical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: String,
    pub menu_item_name: String,
    pub quantity: i64,
    pub price: Money,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub vendor_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatus,
    /// Secret authorizing pickup verification. Its presence signals that a pickup QR can be generated.
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimated_ready_time: DateTime<Utc>,
}

// The `items` column holds the order lines as a JSON array, and the status columns hold the enum names as TEXT,
// so the row mapping is spelled out rather than derived.
impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let items_json: String = row.try_get("items")?;
        let items: Vec<OrderItem> = serde_json::from_str(&items_json)
            .map_err(|e| sqlx::Error::ColumnDecode { index: "items".to_string(), source: Box::new(e) })?;
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatusType>()
            .map_err(|e| sqlx::Error::ColumnDecode { index: "status".to_string(), source: Box::new(e) })?;
        let payment_status: String = row.try_get("payment_status")?;
        let payment_status = payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode { index: "payment_status".to_string(), source: Box::new(e) })?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            vendor_id: row.try_get("vendor_id")?,
            items,
            total_amount: row.try_get("total_amount")?,
            status,
            payment_status,
            verification_token: row.try_get("verification_token")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            estimated_ready_time: row.try_get("estimated_ready_time")?,
        })
    }
}

impl Order {
    /// The QR-encodable payload for this order, if a verification token has been minted.
    pub fn qr_payload(&self) -> Option<QrPayload> {
        self.verification_token.as_ref().map(|token| QrPayload {
            order_id: self.id.clone(),
            verification_token: token.clone(),
        })
    }
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: String,
    pub vendor_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub verification_token: String,
    pub estimated_ready_time: DateTime<Utc>,
}

impl NewOrder {
    /// Ready-time estimate: `now` plus the slowest item's preparation time, with a floor of
    /// [`MIN_PREPARATION_MINUTES`].
    pub fn estimate_ready_time(now: DateTime<Utc>, max_preparation_minutes: i64) -> DateTime<Utc> {
        let minutes = max_preparation_minutes.max(MIN_PREPARATION_MINUTES);
        now + Duration::minutes(minutes)
    }
}

//--------------------------------------      QrPayload        -------------------------------------------------------
/// The string content of a pickup QR code: `{"orderId": …, "verificationToken": …}`. Turning this into an actual
/// image is the client's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub order_id: OrderId,
    pub verification_token: String,
}

impl QrPayload {
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
