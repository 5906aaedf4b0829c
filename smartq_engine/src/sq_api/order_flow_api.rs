use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sq_common::Money;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType, PaymentStatus},
    events::{EventProducers, OrderStatusChangedEvent, PaymentSettledEvent},
    helpers::{mint_verification_token, new_order_id},
    sq_api::{
        order_objects::{OrderRequest, SettlementResult, VerificationResult},
        progress::KitchenPolicy,
    },
    traits::{CatalogManagement, OrderFlowError, OrderManagement},
};

/// The widest tolerated difference, in cents, between the client's claimed total and the server-side total.
/// Covers clients that do their arithmetic in floating point.
pub const TOTAL_TOLERANCE_CENTS: i64 = 1;

/// `OrderFlowApi` is the primary API for handling the order lifecycle: creation with server-side price
/// verification, payment settlement, pickup verification and kitchen progression.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + CatalogManagement
{
    /// Creates a brand-new order.
    ///
    /// Every price comes from the menu, never from the client. The client's claimed total is compared against
    /// the server-side total and the order is rejected when they differ by more than
    /// [`TOTAL_TOLERANCE_CENTS`]. Items the menu does not know are carried with a zero price and an "Unknown"
    /// name, which surfaces the discrepancy in the very same mismatch check.
    pub async fn create_order(&self, request: OrderRequest) -> Result<Order, OrderFlowError> {
        if request.items.is_empty() {
            return Err(OrderFlowError::EmptyOrder);
        }
        if request.claimed_total.value() <= 0 {
            return Err(OrderFlowError::InvalidAmount);
        }
        if let Some(bad) = request.items.iter().find(|i| i.quantity <= 0) {
            return Err(OrderFlowError::InvalidQuantity(bad.menu_item_id.clone()));
        }
        let ids = request.items.iter().map(|i| i.menu_item_id.clone()).collect::<Vec<_>>();
        let menu_items = self.db.fetch_menu_items_by_ids(&request.vendor_id, &ids).await?;
        let mut lines = Vec::with_capacity(request.items.len());
        let mut max_preparation = 0i64;
        for cart_item in &request.items {
            match menu_items.iter().find(|m| m.id == cart_item.menu_item_id) {
                Some(menu_item) => {
                    if !menu_item.is_available {
                        return Err(OrderFlowError::ItemNotAvailable(menu_item.id.clone()));
                    }
                    max_preparation = max_preparation.max(menu_item.preparation_time_minutes);
                    lines.push(OrderItem {
                        menu_item_id: menu_item.id.clone(),
                        menu_item_name: menu_item.name.clone(),
                        quantity: cart_item.quantity,
                        price: menu_item.price,
                    });
                },
                None => {
                    warn!("🔄️📦️ Cart references unknown menu item {}", cart_item.menu_item_id);
                    lines.push(OrderItem {
                        menu_item_id: cart_item.menu_item_id.clone(),
                        menu_item_name: "Unknown".to_string(),
                        quantity: cart_item.quantity,
                        price: Money::from_cents(0),
                    });
                },
            }
        }
        let total = lines.iter().map(|l| l.line_total()).sum::<Money>();
        if total.abs_diff(request.claimed_total) > TOTAL_TOLERANCE_CENTS {
            debug!("🔄️📦️ Rejecting order: claimed total {} differs from priced total {total}", request.claimed_total);
            return Err(OrderFlowError::TotalMismatch { expected: total, got: request.claimed_total });
        }
        let order = NewOrder {
            order_id: OrderId::from(new_order_id()),
            user_id: request.user_id,
            vendor_id: request.vendor_id,
            items: lines,
            total_amount: total,
            verification_token: mint_verification_token(),
            estimated_ready_time: NewOrder::estimate_ready_time(Utc::now(), max_preparation),
        };
        let order = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order {} created for {}, ready around {}", order.id, order.total_amount, order.estimated_ready_time);
        Ok(order)
    }

    /// Fetches an order on behalf of `user_id`. Users only ever see their own orders.
    pub async fn fetch_order(&self, order_id: &OrderId, user_id: &str) -> Result<Order, OrderFlowError> {
        let order =
            self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.user_id != user_id {
            return Err(OrderFlowError::NotYourOrder(order_id.clone()));
        }
        Ok(order)
    }

    /// Every order the user has placed, newest first.
    pub async fn my_orders(&self, user_id: &str) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    /// Cancels an order. Only the owner may cancel, and only while the order is still open:
    /// `Completed` and `Cancelled` orders stay as they are.
    pub async fn cancel_order(&self, order_id: &OrderId, user_id: &str) -> Result<Order, OrderFlowError> {
        let order = self.fetch_order(order_id, user_id).await?;
        if !order.status.can_cancel() {
            return Err(OrderFlowError::CannotCancel(order_id.clone(), order.status));
        }
        let old_status = order.status;
        match self.db.update_status_with_precondition(order_id, old_status, OrderStatusType::Cancelled).await? {
            Some(cancelled) => {
                info!("🔄️📦️ Order {} cancelled by its owner", cancelled.id);
                self.call_status_changed_hook(&cancelled, old_status).await;
                Ok(cancelled)
            },
            // the kitchen moved the order on while the user hit cancel
            None => {
                let current = self
                    .db
                    .fetch_order_by_id(order_id)
                    .await?
                    .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
                Err(OrderFlowError::CannotCancel(order_id.clone(), current.status))
            },
        }
    }

    /// Records the outcome of a payment attempt, and on success moves the order from `Placed` to `Confirmed`.
    ///
    /// The status bump is gated on the order still being `Placed`, so a delayed success callback arriving
    /// after a cancellation records the payment without resurrecting the order.
    pub async fn settle_payment(&self, order_id: &OrderId, success: bool) -> Result<SettlementResult, OrderFlowError> {
        let payment_status = if success { PaymentStatus::Paid } else { PaymentStatus::Failed };
        let order = self.db.set_payment_status(order_id, payment_status).await?;
        trace!("🔄️💰️ Payment for order {} recorded as {payment_status}", order.id);
        let order = if success && order.status == OrderStatusType::Placed {
            match self
                .db
                .update_status_with_precondition(order_id, OrderStatusType::Placed, OrderStatusType::Confirmed)
                .await?
            {
                Some(confirmed) => {
                    debug!("🔄️💰️ Order {} confirmed after successful payment", confirmed.id);
                    self.call_status_changed_hook(&confirmed, OrderStatusType::Placed).await;
                    confirmed
                },
                None => self
                    .db
                    .fetch_order_by_id(order_id)
                    .await?
                    .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?,
            }
        } else {
            order
        };
        self.call_payment_settled_hook(&order, success).await;
        Ok(SettlementResult { order, success })
    }

    /// Verifies a pickup QR scan at the counter.
    ///
    /// A `Placed` order moves to `Confirmed` exactly once; any other status is reported back unchanged, so a
    /// flaky scanner can safely retry. Passing `Some(token)` checks the QR token against the stored one;
    /// `None` skips the check (the server only permits that outside production deployments).
    pub async fn verify_order(
        &self,
        order_id: &OrderId,
        token: Option<&str>,
    ) -> Result<VerificationResult, OrderFlowError> {
        let order =
            self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if let Some(token) = token {
            match &order.verification_token {
                Some(expected) if expected == token => {},
                _ => return Err(OrderFlowError::InvalidVerificationToken(order_id.clone())),
            }
        }
        if order.status != OrderStatusType::Placed {
            trace!("🔄️🎫️ Order {} scanned again in status {}", order.id, order.status);
            return Ok(VerificationResult { order, newly_confirmed: false });
        }
        match self
            .db
            .update_status_with_precondition(order_id, OrderStatusType::Placed, OrderStatusType::Confirmed)
            .await?
        {
            Some(confirmed) => {
                info!("🔄️🎫️ Order {} confirmed at the counter", confirmed.id);
                self.call_status_changed_hook(&confirmed, OrderStatusType::Placed).await;
                Ok(VerificationResult { order: confirmed, newly_confirmed: true })
            },
            // a concurrent scan or payment callback beat us to it; report the current state
            None => {
                let current = self
                    .db
                    .fetch_order_by_id(order_id)
                    .await?
                    .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
                Ok(VerificationResult { order: current, newly_confirmed: false })
            },
        }
    }

    /// Mints a fresh verification token for the order and stores it, invalidating the old QR code.
    /// Only the order's owner may ask for a new one.
    pub async fn resend_verification_token(
        &self,
        order_id: &OrderId,
        user_id: &str,
    ) -> Result<Order, OrderFlowError> {
        self.fetch_order(order_id, user_id).await?;
        let token = mint_verification_token();
        let order = self.db.update_verification_token(order_id, &token).await?;
        debug!("🔄️🎫️ Verification token for order {} reissued", order.id);
        Ok(order)
    }

    /// One tick of the kitchen progression worker. Each in-flight order is offered to the policy, and those
    /// it picks advance one step along Confirmed → Preparing → Ready → Completed.
    ///
    /// Returns the orders that moved.
    pub async fn advance_progressable_orders(
        &self,
        policy: &dyn KitchenPolicy,
    ) -> Result<Vec<Order>, OrderFlowError> {
        let candidates = self.db.fetch_progressable_orders().await?;
        trace!("🕰️ {} order(s) in flight", candidates.len());
        let mut advanced = Vec::new();
        for order in candidates {
            let Some(next) = order.status.next() else { continue };
            if !policy.should_advance(&order) {
                continue;
            }
            if let Some(updated) = self.db.update_status_with_precondition(&order.id, order.status, next).await? {
                debug!("🕰️ Order {} advanced to {next}", updated.id);
                self.call_status_changed_hook(&updated, order.status).await;
                advanced.push(updated);
            }
        }
        if !advanced.is_empty() {
            info!("🕰️ Kitchen tick complete. {} order(s) advanced", advanced.len());
        }
        Ok(advanced)
    }

    async fn call_status_changed_hook(&self, order: &Order, old_status: OrderStatusType) {
        for emitter in &self.producers.status_changed_producer {
            trace!("🔄️📦️ Notifying status change hook subscribers");
            let event = OrderStatusChangedEvent::new(order.clone(), old_status);
            emitter.publish_event(event).await;
        }
    }

    async fn call_payment_settled_hook(&self, order: &Order, success: bool) {
        for emitter in &self.producers.payment_settled_producer {
            trace!("🔄️💰️ Notifying payment settled hook subscribers");
            let event = PaymentSettledEvent::new(order.clone(), success);
            emitter.publish_event(event).await;
        }
    }

    /// Returns a reference to the backing store.
    pub fn db(&self) -> &B {
        &self.db
    }
}
