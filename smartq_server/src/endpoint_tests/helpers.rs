use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::Utc;
use log::debug;
use smartq_engine::db_types::{MenuItem, Order, OrderId, OrderItem, OrderStatusType, PaymentStatus, User};
use sq_common::{Money, Secret};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this key anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_signing_key: Secret::new("endpoint-test-signing-key-925842e11914fdd0c9a2ab8a38dac9de".to_string()),
        jwt_expiry: chrono::Duration::hours(1),
    }
}

pub fn issue_token(claims: JwtClaims) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(claims).expect("Failed to sign token")
}

pub fn user_claims(user_id: &str) -> JwtClaims {
    JwtClaims { sub: user_id.to_string(), email: format!("{user_id}@campus.test") }
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::get().uri(path);
    send_request(req, auth_header, configure).await
}

pub async fn post_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).set_json(body);
    send_request(req, auth_header, configure).await
}

async fn send_request(
    mut req: TestRequest,
    auth_header: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    let req = req.to_request();
    let issuer = TokenIssuer::new(&get_auth_config());
    let app = App::new().app_data(web::Data::new(issuer)).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

//----------------------------------------------   Fixtures  --------------------------------------------------

pub fn seeded_user(user_id: &str, password: &str) -> User {
    User {
        id: user_id.to_string(),
        email: format!("{user_id}@campus.test"),
        password_hash: smartq_engine::hash_password(password).expect("Failed to hash password"),
        name: "Priya Sharma".to_string(),
        phone: "+91-98765-43210".to_string(),
        created_at: Utc::now(),
    }
}

pub fn menu_item(item_id: &str, price_cents: i64, prep_minutes: i64) -> MenuItem {
    MenuItem {
        id: item_id.to_string(),
        vendor_id: "vendor-1".to_string(),
        name: format!("Item {item_id}"),
        description: String::new(),
        price: Money::from_cents(price_cents),
        category: "Meals".to_string(),
        image_url: None,
        is_available: true,
        preparation_time_minutes: prep_minutes,
        created_at: Utc::now(),
    }
}

pub fn order_fixture(
    order_id: &str,
    user_id: &str,
    status: OrderStatusType,
    payment_status: PaymentStatus,
    token: Option<&str>,
) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId::from(order_id.to_string()),
        user_id: user_id.to_string(),
        vendor_id: "vendor-1".to_string(),
        items: vec![OrderItem {
            menu_item_id: "item-1".to_string(),
            menu_item_name: "Masala Dosa".to_string(),
            quantity: 2,
            price: Money::from_cents(12_000),
        }],
        total_amount: Money::from_cents(32_000),
        status,
        payment_status,
        verification_token: token.map(|t| t.to_string()),
        created_at: now,
        updated_at: now,
        estimated_ready_time: now + chrono::Duration::minutes(20),
    }
}
