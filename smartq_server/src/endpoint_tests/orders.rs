use actix_web::{http::StatusCode, web, web::ServiceConfig};
use smartq_engine::{
    db_types::{Order, OrderStatusType, PaymentStatus},
    events::EventProducers,
    OrderFlowApi,
};

use super::{
    helpers::{get_request, issue_token, menu_item, order_fixture, post_request, user_claims},
    mocks::MockBackend,
};
use crate::routes::{CancelOrderRoute, CreateOrderRoute, MyOrdersRoute, OrderByIdRoute, ResendQrRoute};

fn valid_token() -> String {
    issue_token(user_claims("user-1"))
}

#[actix_web::test]
async fn create_order_prices_from_the_menu() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    // 2 × ₹120.00 + 1 × ₹80.00 = ₹320.00
    let body = serde_json::json!({
        "vendorId": "vendor-1",
        "items": [
            { "menuItemId": "item-1", "quantity": 2 },
            { "menuItemId": "item-2", "quantity": 1 }
        ],
        "totalAmount": 320.0
    });
    let (status, body) = post_request(&token, "/orders", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains("\"qrPayload\":"), "No QR payload in {body}");
    assert!(body.contains("PLACED"));
    assert!(body.contains("PENDING"));
}

#[actix_web::test]
async fn create_order_with_wrong_total_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({
        "vendorId": "vendor-1",
        "items": [
            { "menuItemId": "item-1", "quantity": 2 },
            { "menuItemId": "item-2", "quantity": 1 }
        ],
        "totalAmount": 300.0
    });
    let (status, body) = post_request(&token, "/orders", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("does not match the server-side price"), "Unexpected body: {body}");
    assert!(body.contains("₹320.00"), "Expected total missing from body: {body}");
}

#[actix_web::test]
async fn create_order_with_empty_cart_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({ "vendorId": "vendor-1", "items": [], "totalAmount": 320.0 });
    // No expectations: the request must be rejected before the catalog is consulted
    let (status, body) =
        post_request(&token, "/orders", body, configure_no_backend_calls).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("An order must contain at least one item"), "Unexpected body: {body}");
}

#[actix_web::test]
async fn my_orders_lists_the_callers_orders() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let (status, body) = get_request(&token, "/orders/my", configure_my_orders).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ord-1"));
    assert!(body.contains("ord-2"));
}

#[actix_web::test]
async fn another_users_order_reads_as_missing() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let (status, body) = get_request(&token, "/orders/ord-9", configure_foreign_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("The requested order #ord-9 does not exist"), "Unexpected body: {body}");
}

#[actix_web::test]
async fn cancel_an_open_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({});
    let (status, body) = post_request(&token, "/orders/ord-1/cancel", body, configure_cancel_open)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("CANCELLED"), "Order not cancelled: {body}");
}

#[actix_web::test]
async fn cancel_a_completed_order_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({});
    let (status, body) =
        post_request(&token, "/orders/ord-1/cancel", body, configure_cancel_completed).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("cannot be cancelled from the COMPLETED status"), "Unexpected body: {body}");
}

#[actix_web::test]
async fn resend_qr_remints_the_token() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({});
    let (status, body) =
        post_request(&token, "/orders/ord-1/resend-qr", body, configure_resend_qr).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("fresh-token"), "New token missing from {body}");
    assert!(!body.contains("stale-token"), "Old token still present in {body}");
}

fn order_api(backend: MockBackend) -> OrderFlowApi<MockBackend> {
    OrderFlowApi::new(backend, EventProducers::default())
}

fn register_order_routes(cfg: &mut ServiceConfig, api: OrderFlowApi<MockBackend>) {
    cfg.service(MyOrdersRoute::<MockBackend>::new())
        .service(CreateOrderRoute::<MockBackend>::new())
        .service(ResendQrRoute::<MockBackend>::new())
        .service(CancelOrderRoute::<MockBackend>::new())
        .service(OrderByIdRoute::<MockBackend>::new())
        .app_data(web::Data::new(api));
}

fn configure_create(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_menu_items_by_ids()
        .returning(|_, _| Ok(vec![menu_item("item-1", 12_000, 15), menu_item("item-2", 8_000, 10)]));
    backend.expect_insert_order().returning(|new_order| {
        let mut order = order_fixture("ord-1", "user-1", OrderStatusType::Placed, PaymentStatus::Pending, None);
        order.items = new_order.items;
        order.total_amount = new_order.total_amount;
        order.verification_token = Some(new_order.verification_token);
        Ok(order)
    });
    register_order_routes(cfg, order_api(backend));
}

fn configure_no_backend_calls(cfg: &mut ServiceConfig) {
    register_order_routes(cfg, order_api(MockBackend::new()));
}

fn configure_my_orders(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_orders_for_user().returning(|user_id| {
        Ok(vec![
            order_fixture("ord-1", user_id, OrderStatusType::Preparing, PaymentStatus::Paid, Some("tok-1")),
            order_fixture("ord-2", user_id, OrderStatusType::Completed, PaymentStatus::Paid, None),
        ])
    });
    register_order_routes(cfg, order_api(backend));
}

fn configure_foreign_order(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(order_id.as_str(), "user-2", OrderStatusType::Placed, PaymentStatus::Pending, None)))
    });
    register_order_routes(cfg, order_api(backend));
}

fn configure_cancel_open(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(order_id.as_str(), "user-1", OrderStatusType::Placed, PaymentStatus::Pending, None)))
    });
    backend.expect_update_status_with_precondition().returning(|order_id, _, new_status| {
        Ok(Some(order_fixture(order_id.as_str(), "user-1", new_status, PaymentStatus::Pending, None)))
    });
    register_order_routes(cfg, order_api(backend));
}

fn configure_cancel_completed(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(order_id.as_str(), "user-1", OrderStatusType::Completed, PaymentStatus::Paid, None)))
    });
    register_order_routes(cfg, order_api(backend));
}

fn configure_resend_qr(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(
            order_id.as_str(),
            "user-1",
            OrderStatusType::Placed,
            PaymentStatus::Pending,
            Some("stale-token"),
        )))
    });
    backend.expect_update_verification_token().returning(|order_id, _| {
        let mut order: Order =
            order_fixture(order_id.as_str(), "user-1", OrderStatusType::Placed, PaymentStatus::Pending, None);
        order.verification_token = Some("fresh-token".to_string());
        Ok(order)
    });
    register_order_routes(cfg, order_api(backend));
}
