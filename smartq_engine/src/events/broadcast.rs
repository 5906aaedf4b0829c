//! Fan-out of order status updates to live subscribers.
//!
//! The hub wraps a [`tokio::sync::broadcast`] channel. Every status transition is published once; subscribers
//! hold their own receiver and apply an [`UpdateFilter`] locally. A slow subscriber that falls behind the
//! channel capacity misses the overwritten updates rather than stalling the producers (at-most-once delivery).
use log::*;
use tokio::sync::broadcast;

use crate::{
    db_types::OrderId,
    events::OrderStatusChangedEvent,
};

pub const DEFAULT_HUB_CAPACITY: usize = 128;

/// Selects which order updates a subscriber cares about. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct UpdateFilter {
    pub order_id: Option<OrderId>,
    pub user_id: Option<String>,
}

impl UpdateFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_order(order_id: OrderId) -> Self {
        Self { order_id: Some(order_id), user_id: None }
    }

    pub fn for_user<S: Into<String>>(user_id: S) -> Self {
        Self { order_id: None, user_id: Some(user_id.into()) }
    }

    pub fn matches(&self, event: &OrderStatusChangedEvent) -> bool {
        if let Some(id) = &self.order_id {
            if &event.order.id != id {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if &event.order.user_id != user_id {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct OrderUpdateHub {
    sender: broadcast::Sender<OrderStatusChangedEvent>,
}

impl Default for OrderUpdateHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

impl OrderUpdateHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a status change to every live subscriber. Returns the number of receivers that saw it.
    pub fn publish(&self, event: OrderStatusChangedEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => {
                trace!("📬️ Order update delivered to {n} subscriber(s)");
                n
            },
            Err(_) => {
                // nobody is listening right now, which is fine
                trace!("📬️ Order update published with no subscribers");
                0
            },
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderStatusChangedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
