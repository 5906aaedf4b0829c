use serde::Serialize;

use crate::db_types::{Order, OrderStatusType};

/// Fired whenever an order moves from one status to another, whether by payment settlement, the kitchen
/// progression worker, pickup verification, or a user cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub old_status: OrderStatusType,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, old_status: OrderStatusType) -> Self {
        Self { order, old_status }
    }
}

/// Fired when a payment for an order settles, successfully or not.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSettledEvent {
    pub order: Order,
    pub success: bool,
}

impl PaymentSettledEvent {
    pub fn new(order: Order, success: bool) -> Self {
        Self { order, success }
    }
}
