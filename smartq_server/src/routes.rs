//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use smartq_engine::{
    db_types::OrderId,
    order_objects::OrderRequest,
    traits::{CatalogManagement, OrderManagement, UserManagement},
    AuthApi,
    CatalogApi,
    OrderFlowApi,
};
use sq_common::Secret;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::ServerOptions,
    data_objects::{
        CheckoutSessionRequest,
        ConfirmPaymentRequest,
        CreateOrderRequest,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        OrderResponse,
        ProcessPaymentRequest,
        ProcessPaymentResponse,
        RegisterRequest,
        ResendQrResponse,
        VerifyOrderRequest,
        VerifyOrderResponse,
    },
    errors::{AuthError, ServerError},
    integrations::{PaymentProvider, PaymentSimulator},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where $provider:path) => {
        paste::paste! { pub struct [<$name:camel Route>]<A, P>(core::marker::PhantomData<fn() -> A>, core::marker::PhantomData<fn() -> P>);}
        paste::paste! { impl<A, P> [<$name:camel Route>]<A, P> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>, core::marker::PhantomData::<fn() -> P>)
            }
        }}
        paste::paste! { impl<A, P> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A, P>
        where
            A: $($bounds +)+ 'static,
            P: $provider + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A, P>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/auth/register" impl UserManagement);
/// Creates a user account and logs it in. The response carries the access token and the new profile; the
/// password hash never leaves the engine.
pub async fn register<A>(
    body: web::Json<RegisterRequest>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError>
where
    A: UserManagement,
{
    let req = body.into_inner();
    trace!("💻️ Received registration request for {}", req.email);
    let user = api.register(&req.email, Secret::new(req.password), &req.name, &req.phone).await?;
    let token = signer
        .issue_token(JwtClaims { sub: user.id.clone(), email: user.email.clone() })
        .map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))?;
    Ok(HttpResponse::Created().json(LoginResponse { token, user }))
}

route!(login => Post "/auth/login" impl UserManagement);
pub async fn login<A>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError>
where
    A: UserManagement,
{
    let req = body.into_inner();
    trace!("💻️ Received login request for {}", req.email);
    let user = api.login(&req.email, Secret::new(req.password)).await?;
    let token = signer
        .issue_token(JwtClaims { sub: user.id.clone(), email: user.email.clone() })
        .map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))?;
    Ok(HttpResponse::Ok().json(LoginResponse { token, user }))
}

route!(profile => Get "/auth/profile" impl UserManagement);
pub async fn profile<A: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET profile for {}", claims.sub);
    let user = api.profile(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(user))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(vendors => Get "/vendors" impl CatalogManagement);
pub async fn vendors<A: CatalogManagement>(api: web::Data<CatalogApi<A>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET vendors");
    let vendors = api.vendors().await?;
    Ok(HttpResponse::Ok().json(vendors))
}

route!(vendor_by_id => Get "/vendors/{id}" impl CatalogManagement);
pub async fn vendor_by_id<A: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let vendor_id = path.into_inner();
    debug!("💻️ GET vendor {vendor_id}");
    let vendor = api.vendor(&vendor_id).await?;
    Ok(HttpResponse::Ok().json(vendor))
}

route!(menu_for_vendor => Get "/menu/{vendor_id}" impl CatalogManagement);
pub async fn menu_for_vendor<A: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let vendor_id = path.into_inner();
    debug!("💻️ GET menu for vendor {vendor_id}");
    let menu = api.menu(&vendor_id).await?;
    Ok(HttpResponse::Ok().json(menu))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement, CatalogManagement);
/// Creates an order for the authenticated user. Prices come from the menu; the client total is only
/// checked, never trusted. The response includes the pickup QR payload.
pub async fn create_order<A>(
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    let req = body.into_inner();
    debug!("💻️ POST create order for {} at vendor {}", claims.sub, req.vendor_id);
    let request = OrderRequest {
        user_id: claims.sub,
        vendor_id: req.vendor_id,
        items: req.items,
        claimed_total: req.total_amount,
    };
    let order = api.create_order(request).await?;
    Ok(HttpResponse::Created().json(OrderResponse::with_qr(order)))
}

route!(my_orders => Get "/orders/my" impl OrderManagement, CatalogManagement);
pub async fn my_orders<A>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    debug!("💻️ GET my_orders for {}", claims.sub);
    let orders = api.my_orders(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderManagement, CatalogManagement);
/// Fetches a single order. Only the owner sees it; anyone else gets a 404, whether it exists or not.
pub async fn order_by_id<A>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id}");
    let order = api.fetch_order(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::with_qr(order)))
}

route!(verify_order => Post "/orders/verify" impl OrderManagement, CatalogManagement);
/// Pickup verification, called by vendor scanning stations. Unauthenticated: possession of the QR token is
/// the credential. Omitting the token is only allowed when the server is configured for it (dev setups).
pub async fn verify_order<A>(
    body: web::Json<VerifyOrderRequest>,
    options: web::Data<ServerOptions>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    let req = body.into_inner();
    debug!("💻️ POST verify order {}", req.order_id);
    if options.require_verification_token && req.verification_token.is_none() {
        debug!("💻️ Verification for {} rejected: no token supplied", req.order_id);
        return Err(ServerError::AuthenticationError(AuthError::InvalidVerificationToken));
    }
    let result = api.verify_order(&req.order_id, req.verification_token.as_deref()).await?;
    Ok(HttpResponse::Ok().json(VerifyOrderResponse { order: result.order, newly_confirmed: result.newly_confirmed }))
}

route!(resend_qr => Post "/orders/{id}/resend-qr" impl OrderManagement, CatalogManagement);
/// Remints the pickup token for an order and returns the new QR payload. The previous QR stops working.
pub async fn resend_qr<A>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    let order_id = path.into_inner();
    debug!("💻️ POST resend QR for order {order_id}");
    let order = api.resend_verification_token(&order_id, &claims.sub).await?;
    let qr = order.qr_payload().ok_or_else(|| {
        ServerError::BackendError(format!("Order {order_id} has no verification token after a remint"))
    })?;
    Ok(HttpResponse::Ok().json(ResendQrResponse::new(order, qr)))
}

route!(cancel_order => Post "/orders/{id}/cancel" impl OrderManagement, CatalogManagement);
pub async fn cancel_order<A>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    let order_id = path.into_inner();
    debug!("💻️ POST cancel order {order_id}");
    let order = api.cancel_order(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::without_qr(order)))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(process_payment => Post "/payments/process" impl OrderManagement, CatalogManagement);
/// Direct payment for dev and demo deployments: runs the simulated terminal and settles the order with the
/// outcome. Real money goes through the checkout-session flow instead.
pub async fn process_payment<A>(
    claims: JwtClaims,
    body: web::Json<ProcessPaymentRequest>,
    simulator: web::Data<PaymentSimulator>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    let req = body.into_inner();
    debug!("💻️ POST process payment for order {}", req.order_id);
    // ownership check before we touch any money state
    let order = api.fetch_order(&req.order_id, &claims.sub).await?;
    if let Some(amount) = req.amount {
        if amount.abs_diff(order.total_amount) > smartq_engine::TOTAL_TOLERANCE_CENTS {
            return Err(ServerError::ValidationError(format!(
                "The submitted amount {amount} does not match the order total {}",
                order.total_amount
            )));
        }
    }
    let (success, transaction_id) = simulator.attempt().await;
    let result = api.settle_payment(&req.order_id, success).await?;
    Ok(HttpResponse::Ok().json(ProcessPaymentResponse { success, transaction_id, order: result.order }))
}

route!(create_checkout_session => Post "/payments/create-checkout-session" impl OrderManagement, CatalogManagement where PaymentProvider);
/// Creates a hosted checkout session at the gateway for the given order. The caller redirects the user to
/// the returned URL; the outcome arrives later via webhook or the confirm endpoint.
pub async fn create_checkout_session<A, P>(
    claims: JwtClaims,
    body: web::Json<CheckoutSessionRequest>,
    provider: web::Data<P>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    let req = body.into_inner();
    debug!("💻️ POST create checkout session for order {}", req.order_id);
    if !provider.is_configured() {
        return Err(ServerError::PaymentGatewayNotConfigured);
    }
    let order = api.fetch_order(&req.order_id, &claims.sub).await?;
    let session = provider
        .create_checkout_session(&order.id, order.total_amount, req.success_url.as_deref(), req.cancel_url.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

route!(confirm_payment => Post "/payments/confirm" impl OrderManagement, CatalogManagement where PaymentProvider);
/// Confirms a checkout session by asking the gateway for its state. Unauthenticated so the success-page
/// redirect can call it; the session id is the credential and the gateway is the source of truth.
pub async fn confirm_payment<A, P>(
    body: web::Json<ConfirmPaymentRequest>,
    provider: web::Data<P>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
    P: PaymentProvider,
{
    let req = body.into_inner();
    debug!("💻️ POST confirm payment for session {}", req.session_id);
    if !provider.is_configured() {
        return Err(ServerError::PaymentGatewayNotConfigured);
    }
    let state = provider.fetch_session(&req.session_id).await?;
    if !state.paid {
        return Err(ServerError::PaymentIncomplete);
    }
    let order_id = state
        .order_id
        .ok_or_else(|| ServerError::InvalidRequestBody("The checkout session names no order".to_string()))?;
    let result = api.settle_payment(&order_id, true).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::without_qr(result.order)))
}

/// Gateway webhook ingestion. Registered under its own scope wrapped in the signature middleware, so the
/// delivery is already authenticated by the time this handler parses the body. Unrecognized event kinds are
/// acked so the gateway stops retrying them.
pub async fn payment_webhook<A>(
    body: web::Bytes,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + CatalogManagement,
{
    let event: crate::data_objects::WebhookEvent =
        serde_json::from_slice(&body).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    debug!("💻️🪝️ Webhook event {} received ({})", event.id, event.kind);
    let outcome = match event.kind.as_str() {
        "checkout.session.completed" => Some(true),
        "checkout.session.async_payment_failed" | "payment_intent.payment_failed" => Some(false),
        _ => None,
    };
    let Some(success) = outcome else {
        trace!("💻️🪝️ Ignoring webhook event kind {}", event.kind);
        return Ok(HttpResponse::Ok().json(JsonResponse::success("Event acknowledged")));
    };
    let order_id = event
        .data
        .object
        .order_id()
        .ok_or_else(|| ServerError::InvalidRequestBody("Webhook event does not reference an order".to_string()))?;
    let result = api.settle_payment(&order_id, success).await?;
    info!("💻️🪝️ Payment for order {} recorded as {} via webhook", result.order.id, result.order.payment_status);
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {} updated", result.order.id))))
}
