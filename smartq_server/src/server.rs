use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use smartq_engine::{
    events::{EventHandlers, EventHooks, EventProducers, OrderUpdateHub},
    AuthApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::{PaymentProvider, PaymentSimulator, StripeGateway},
    middleware::SignatureMiddlewareFactory,
    progress_worker::start_progress_worker,
    routes::{
        health,
        payment_webhook,
        CancelOrderRoute,
        ConfirmPaymentRoute,
        CreateCheckoutSessionRoute,
        CreateOrderRoute,
        LoginRoute,
        MenuForVendorRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        ProcessPaymentRoute,
        ProfileRoute,
        RegisterRoute,
        ResendQrRoute,
        VendorByIdRoute,
        VendorsRoute,
        VerifyOrderRoute,
    },
    sse::order_events,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let hub = OrderUpdateHub::default();
    let producers = start_event_handlers(hub.clone()).await;
    let _worker = start_progress_worker(
        db.clone(),
        producers.clone(),
        config.progress_interval_secs,
        config.advance_probability,
    );
    let gateway = StripeGateway::new(&config.payment).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, producers, hub, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires the status-change hook up to the broadcast hub, so every transition reaches live SSE subscribers,
/// and starts the handler tasks. Settlements additionally land in the log as an audit trail.
pub async fn start_event_handlers(hub: OrderUpdateHub) -> EventProducers {
    let mut hooks = EventHooks::default();
    hooks.on_status_changed(move |event| {
        let hub = hub.clone();
        Box::pin(async move {
            hub.publish(event);
        })
    });
    hooks.on_payment_settled(|event| {
        Box::pin(async move {
            let outcome = if event.success { "settled" } else { "declined" };
            info!(
                "📬️💰️ Payment of {} for order {} was {outcome}",
                event.order.total_amount, event.order.id
            );
        })
    });
    let handlers = EventHandlers::new(64, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    producers
}

pub fn create_server_instance<P>(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    hub: OrderUpdateHub,
    provider: P,
) -> Result<Server, ServerError>
where
    P: PaymentProvider + Send + Sync + 'static,
{
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let auth_api = AuthApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let options = ServerOptions::from_config(&config);
        let simulator = PaymentSimulator::new(config.payment.simulated_failure_rate);
        let signature_checks = config.payment.signature_checks && !config.payment.webhook_secret.reveal().is_empty();
        let webhook_scope = web::scope("/payments/webhook")
            .wrap(SignatureMiddlewareFactory::new(config.payment.webhook_secret.clone(), signature_checks))
            .route("", web::post().to(payment_webhook::<SqliteDatabase>));
        let api_scope = web::scope("/api")
            .service(webhook_scope)
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(ProfileRoute::<SqliteDatabase>::new())
            .service(VendorsRoute::<SqliteDatabase>::new())
            .service(VendorByIdRoute::<SqliteDatabase>::new())
            .service(MenuForVendorRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(VerifyOrderRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(ResendQrRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(ProcessPaymentRoute::<SqliteDatabase>::new())
            .service(CreateCheckoutSessionRoute::<SqliteDatabase, P>::new())
            .service(ConfirmPaymentRoute::<SqliteDatabase, P>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("smartq::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(options))
            .app_data(web::Data::new(simulator))
            .app_data(web::Data::new(provider.clone()))
            .app_data(web::Data::new(hub.clone()))
            .service(health)
            .service(api_scope)
            .route("/events/orders", web::get().to(order_events))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
