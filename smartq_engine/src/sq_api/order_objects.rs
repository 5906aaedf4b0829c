use serde::{Deserialize, Serialize};
use sq_common::Money;

use crate::db_types::{Order, OrderId};

/// One line of a client's cart: the item they want and how many. Prices are deliberately absent; the server
/// looks them up itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub quantity: i64,
}

/// Everything the engine needs to create an order on behalf of a user.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub user_id: String,
    pub vendor_id: String,
    pub items: Vec<CartItem>,
    /// The total the client displayed to the user. Checked against the server-side total; never trusted.
    pub claimed_total: Money,
}

/// The outcome of a pickup verification attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub order: Order,
    /// True when this call moved the order from `Placed` to `Confirmed`. False when the order had already
    /// moved on and the call changed nothing.
    pub newly_confirmed: bool,
}

/// The outcome of a payment settlement.
#[derive(Debug, Clone)]
pub struct SettlementResult {
    pub order: Order,
    pub success: bool,
}

impl SettlementResult {
    pub fn order_id(&self) -> &OrderId {
        &self.order.id
    }
}
