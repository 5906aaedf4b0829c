use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use smartq_engine::{
    db_types::{OrderId, OrderStatusType, PaymentStatus},
    events::EventProducers,
    OrderFlowApi,
};
use sq_common::Secret;

use super::{
    helpers::{issue_token, order_fixture, post_request, user_claims},
    mocks::{MockBackend, MockGateway},
};
use crate::{
    helpers::webhook_signature,
    integrations::{CheckoutSession, PaymentSimulator, SessionState},
    middleware::{SignatureMiddlewareFactory, SIGNATURE_HEADER},
    routes::{payment_webhook, ConfirmPaymentRoute, CreateCheckoutSessionRoute, ProcessPaymentRoute},
};

const WEBHOOK_SECRET: &str = "whsec_endpoint_test_only";

fn valid_token() -> String {
    issue_token(user_claims("user-1"))
}

//----------------------------------------------   Direct payments  -------------------------------------------

#[actix_web::test]
async fn a_successful_payment_confirms_the_order() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({ "orderId": "ord-1", "amount": 320.0, "paymentMethod": "upi" });
    let (status, body) =
        post_request(&token, "/payments/process", body, configure_process_success).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"), "Unexpected body: {body}");
    assert!(body.contains("txn_"), "No transaction id in {body}");
    assert!(body.contains("CONFIRMED"));
}

#[actix_web::test]
async fn a_declined_payment_leaves_the_order_placed() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({ "orderId": "ord-1" });
    let (status, body) =
        post_request(&token, "/payments/process", body, configure_process_decline).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":false"), "Unexpected body: {body}");
    assert!(body.contains("FAILED"));
    assert!(body.contains("PLACED"));
}

#[actix_web::test]
async fn a_payment_for_the_wrong_amount_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    // the fixture order totals ₹320.00
    let body = serde_json::json!({ "orderId": "ord-1", "amount": 250.0 });
    let (status, body) =
        post_request(&token, "/payments/process", body, configure_process_fetch_only).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("does not match the order total"), "Unexpected body: {body}");
}

//----------------------------------------------   Checkout sessions  -----------------------------------------

#[actix_web::test]
async fn checkout_sessions_need_a_configured_gateway() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({ "orderId": "ord-1" });
    let (status, body) = post_request(&token, "/payments/create-checkout-session", body, configure_gateway_unconfigured)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("The payment gateway is not configured on this server"), "Unexpected body: {body}");
}

#[actix_web::test]
async fn checkout_session_returns_the_redirect_url() {
    let _ = env_logger::try_init().ok();
    let token = valid_token();
    let body = serde_json::json!({ "orderId": "ord-1", "successUrl": "https://smartq.test/paid" });
    let (status, body) = post_request(&token, "/payments/create-checkout-session", body, configure_gateway_session)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("cs_test_1"));
    assert!(body.contains("https://gateway.test/pay/cs_test_1"));
}

#[actix_web::test]
async fn confirming_an_unpaid_session_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "sessionId": "cs_test_1" });
    let (status, body) =
        post_request("", "/payments/confirm", body, configure_confirm_unpaid).await.expect("Request failed");
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body.contains("The payment for this session has not completed"), "Unexpected body: {body}");
}

#[actix_web::test]
async fn confirming_a_paid_session_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "sessionId": "cs_test_1" });
    let (status, body) =
        post_request("", "/payments/confirm", body, configure_confirm_paid).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("CONFIRMED"));
    assert!(body.contains("PAID"));
}

//----------------------------------------------   Webhooks  --------------------------------------------------

#[actix_web::test]
async fn a_correctly_signed_webhook_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let body = completed_session_event("ord-1");
    let timestamp = "1700000000";
    let signature = webhook_signature(WEBHOOK_SECRET, timestamp, body.as_bytes());
    let header = format!("t={timestamp},v1={signature}");
    let (status, body) =
        webhook_request(Some(&header), &body, configure_webhook_settlement).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order #ord-1 updated"), "Unexpected body: {body}");
}

#[actix_web::test]
async fn a_badly_signed_webhook_changes_nothing() {
    let _ = env_logger::try_init().ok();
    let body = completed_session_event("ord-1");
    let header = format!("t=1700000000,v1={}", "0".repeat(64));
    // No expectations on the backend: a forged delivery must not touch the books
    let err = webhook_request(Some(&header), &body, configure_webhook_untouched).await.expect_err("Expected error");
    assert_eq!(err, "Invalid webhook signature.");
}

#[actix_web::test]
async fn an_unsigned_webhook_is_denied() {
    let _ = env_logger::try_init().ok();
    let body = completed_session_event("ord-1");
    let err = webhook_request(None, &body, configure_webhook_untouched).await.expect_err("Expected error");
    assert_eq!(err, "No webhook signature found.");
}

#[actix_web::test]
async fn unrecognized_webhook_events_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = r#"{
        "id": "evt_2",
        "type": "invoice.paid",
        "data": { "object": { "id": "in_1" } }
    }"#;
    let timestamp = "1700000000";
    let signature = webhook_signature(WEBHOOK_SECRET, timestamp, body.as_bytes());
    let header = format!("t={timestamp},v1={signature}");
    let (status, body) = webhook_request(Some(&header), body, configure_webhook_untouched).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Event acknowledged"), "Unexpected body: {body}");
}

fn completed_session_event(order_id: &str) -> String {
    serde_json::json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_1",
            "client_reference_id": order_id,
            "payment_status": "paid"
        }}
    })
    .to_string()
}

async fn webhook_request(
    signature_header: Option<&str>,
    body: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post()
        .uri("/payments/webhook")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    if let Some(header) = signature_header {
        req = req.insert_header((SIGNATURE_HEADER, header));
    }
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

//----------------------------------------------   Configurations  --------------------------------------------

fn settlement_backend() -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(
            order_id.as_str(),
            "user-1",
            OrderStatusType::Placed,
            PaymentStatus::Pending,
            Some("tok-1"),
        )))
    });
    backend.expect_set_payment_status().returning(|order_id, payment_status| {
        Ok(order_fixture(order_id.as_str(), "user-1", OrderStatusType::Placed, payment_status, Some("tok-1")))
    });
    backend.expect_update_status_with_precondition().returning(|order_id, _, new_status| {
        Ok(Some(order_fixture(order_id.as_str(), "user-1", new_status, PaymentStatus::Paid, Some("tok-1"))))
    });
    backend
}

fn register_payment_routes(cfg: &mut ServiceConfig, backend: MockBackend, simulator: PaymentSimulator) {
    let api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(ProcessPaymentRoute::<MockBackend>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(simulator));
}

fn configure_process_success(cfg: &mut ServiceConfig) {
    register_payment_routes(cfg, settlement_backend(), PaymentSimulator::instant(0.0));
}

fn configure_process_decline(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(
            order_id.as_str(),
            "user-1",
            OrderStatusType::Placed,
            PaymentStatus::Pending,
            Some("tok-1"),
        )))
    });
    backend.expect_set_payment_status().returning(|order_id, payment_status| {
        Ok(order_fixture(order_id.as_str(), "user-1", OrderStatusType::Placed, payment_status, Some("tok-1")))
    });
    register_payment_routes(cfg, backend, PaymentSimulator::instant(1.0));
}

fn configure_process_fetch_only(cfg: &mut ServiceConfig) {
    // No settlement expectations: a rejected amount must leave the books alone
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(
            order_id.as_str(),
            "user-1",
            OrderStatusType::Placed,
            PaymentStatus::Pending,
            Some("tok-1"),
        )))
    });
    register_payment_routes(cfg, backend, PaymentSimulator::instant(0.0));
}

fn register_session_routes(cfg: &mut ServiceConfig, backend: MockBackend, gateway: MockGateway) {
    let api = OrderFlowApi::new(backend, EventProducers::default());
    cfg.service(CreateCheckoutSessionRoute::<MockBackend, MockGateway>::new())
        .service(ConfirmPaymentRoute::<MockBackend, MockGateway>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(gateway));
}

fn configure_gateway_unconfigured(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(false);
    register_session_routes(cfg, MockBackend::new(), gateway);
}

fn configure_gateway_session(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_id().returning(|order_id| {
        Ok(Some(order_fixture(
            order_id.as_str(),
            "user-1",
            OrderStatusType::Placed,
            PaymentStatus::Pending,
            Some("tok-1"),
        )))
    });
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(true);
    gateway.expect_create_checkout_session().returning(|_, _, _, _| {
        Ok(CheckoutSession {
            session_id: "cs_test_1".to_string(),
            redirect_url: "https://gateway.test/pay/cs_test_1".to_string(),
        })
    });
    register_session_routes(cfg, backend, gateway);
}

fn configure_confirm_unpaid(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(true);
    gateway.expect_fetch_session().returning(|_| Ok(SessionState { paid: false, order_id: None }));
    register_session_routes(cfg, MockBackend::new(), gateway);
}

fn configure_confirm_paid(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(true);
    gateway.expect_fetch_session().returning(|_| {
        Ok(SessionState { paid: true, order_id: Some(OrderId::from("ord-1".to_string())) })
    });
    register_session_routes(cfg, settlement_backend(), gateway);
}

fn register_webhook_scope(cfg: &mut ServiceConfig, backend: MockBackend) {
    let api = OrderFlowApi::new(backend, EventProducers::default());
    let scope = web::scope("/payments/webhook")
        .wrap(SignatureMiddlewareFactory::new(Secret::new(WEBHOOK_SECRET.to_string()), true))
        .route("", web::post().to(payment_webhook::<MockBackend>));
    cfg.service(scope).app_data(web::Data::new(api));
}

fn configure_webhook_settlement(cfg: &mut ServiceConfig) {
    register_webhook_scope(cfg, settlement_backend());
}

fn configure_webhook_untouched(cfg: &mut ServiceConfig) {
    register_webhook_scope(cfg, MockBackend::new());
}
