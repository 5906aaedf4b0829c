use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId, OrderStatusType, PaymentStatus};

/// This trait defines the order lifecycle behaviour for backends supporting the order flow engine.
///
/// This behaviour includes:
/// * Inserting new orders atomically.
/// * Guarded status transitions (an update only lands if the order is still in the status the caller saw).
/// * Payment settlement bookkeeping.
/// * The queries the kitchen progression worker relies on.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores the order in the database in a single atomic transaction.
    ///
    /// Returns the full order record as stored. Fails with [`OrderFlowError::OrderAlreadyExists`] if an order
    /// with the same id is already present.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    /// Fetches the order with the given id, or `None` if it does not exist.
    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches every order placed by the given user, most recent first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderFlowError>;

    /// Transitions the order to `new_status`, but only if it is still in `expected_status`.
    ///
    /// This is the only way order status is ever written. The precondition closes the race between the
    /// progression worker, payment settlement and pickup verification: whichever writer loses simply
    /// observes that the order has moved on, via the `Ok(None)` return.
    ///
    /// Returns the updated order, or `None` if the precondition did not hold.
    async fn update_status_with_precondition(
        &self,
        order_id: &OrderId,
        expected_status: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, OrderFlowError>;

    /// Records the outcome of a payment attempt against the order.
    async fn set_payment_status(
        &self,
        order_id: &OrderId,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrderFlowError>;

    /// Replaces the verification token on the order. The old token stops working immediately.
    async fn update_verification_token(&self, order_id: &OrderId, token: &str) -> Result<Order, OrderFlowError>;

    /// Fetches every order the kitchen progression worker may advance: paid, and in `Confirmed`,
    /// `Preparing` or `Ready`. Oldest first.
    async fn fetch_progressable_orders(&self) -> Result<Vec<Order>, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} does not belong to the requesting user")]
    NotYourOrder(OrderId),
    #[error("Order {0} cannot be cancelled from the {1} status")]
    CannotCancel(OrderId, OrderStatusType),
    #[error("The verification token presented for order {0} is not valid")]
    InvalidVerificationToken(OrderId),
    #[error("The submitted total does not match the server-side price. Expected {expected}, got {got}")]
    TotalMismatch { expected: sq_common::Money, got: sq_common::Money },
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("The order total must be a positive amount")]
    InvalidAmount,
    #[error("Every item in an order must have a positive quantity. {0} does not")]
    InvalidQuantity(String),
    #[error("Menu item {0} is not available from this vendor")]
    ItemNotAvailable(String),
    #[error("{0}")]
    CatalogError(#[from] super::CatalogApiError),
    #[error("Invalid stored record: {0}")]
    RecordMalformed(String),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
