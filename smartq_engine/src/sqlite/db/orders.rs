use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, PaymentStatus},
    traits::OrderFlowError,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// New orders always start out as `PLACED` / `PENDING`.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    if fetch_order_by_id(&order.order_id, conn).await?.is_some() {
        return Err(OrderFlowError::OrderAlreadyExists(order.order_id));
    }
    let items = serde_json::to_string(&order.items)
        .map_err(|e| OrderFlowError::RecordMalformed(format!("Cannot serialize order items: {e}")))?;
    let now = Utc::now();
    let inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                id,
                user_id,
                vendor_id,
                items,
                total_amount,
                status,
                payment_status,
                verification_token,
                created_at,
                updated_at,
                estimated_ready_time
            ) VALUES ($1, $2, $3, $4, $5, 'PLACED', 'PENDING', $6, $7, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(&order.order_id)
    .bind(&order.user_id)
    .bind(&order.vendor_id)
    .bind(items)
    .bind(order.total_amount.value())
    .bind(&order.verification_token)
    .bind(now)
    .bind(order.estimated_ready_time)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order {} inserted for user {}", inserted.id, inserted.user_id);
    Ok(inserted)
}

pub async fn fetch_order_by_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns every order placed by the user, newest first.
pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Moves the order from `expected` to `new_status` in one guarded UPDATE. The WHERE clause carries the
/// expected status, so a concurrent writer that got there first makes this a no-op and `None` is returned.
pub async fn update_status_with_precondition(
    order_id: &OrderId,
    expected: OrderStatusType,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let updated: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_at = $2
            WHERE id = $3 AND status = $4
            RETURNING *;
        "#,
    )
    .bind(new_status.to_string())
    .bind(Utc::now())
    .bind(order_id.as_str())
    .bind(expected.to_string())
    .fetch_optional(conn)
    .await?;
    match &updated {
        Some(o) => debug!("🗃️ Order {} moved {expected} → {new_status}", o.id),
        None => debug!("🗃️ Order {order_id} was not in {expected}; status left untouched"),
    }
    Ok(updated)
}

pub async fn set_payment_status(
    order_id: &OrderId,
    payment_status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let updated: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET payment_status = $1, updated_at = $2
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(payment_status.to_string())
    .bind(Utc::now())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    updated.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
}

pub async fn update_verification_token(
    order_id: &OrderId,
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let updated: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET verification_token = $1, updated_at = $2
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    updated.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
}

/// Fetches every order the progression worker may advance, oldest first so that long-waiting orders are
/// considered before fresh ones. Unpaid orders never progress.
pub async fn fetch_progressable_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE payment_status = 'PAID' AND status IN ('CONFIRMED', 'PREPARING', 'READY')
            ORDER BY created_at ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
