use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use storefront_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CartApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    middleware::AuthTokenMiddlewareFactory,
    routes::{
        health,
        AddToCartRoute,
        CartRoute,
        ClearCartRoute,
        CreateOrderRoute,
        CreateProductRoute,
        DeleteProductRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        ProductByIdRoute,
        ProductsRoute,
        RemoveCartItemRoute,
        UpdateCartItemRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(32, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The default event subscribers: one log line per order created and per status change.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|event| {
        Box::pin(async move {
            info!(
                "📦️ Order #{} created for {}. {} line(s), {} total.",
                event.order.id,
                event.order.user_id,
                event.items.len(),
                event.order.total
            );
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks.on_status_changed(|event| {
        Box::pin(async move {
            info!("📦️ Order #{} moved from {} to {}.", event.order.id, event.old_status, event.new_status);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let tax_rate = config.tax_rate;
    let checkout_config = config.checkout_config();
    let auth_config = config.auth;
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone(), tax_rate);
        let catalog_api = CatalogApi::new(db.clone());
        let order_flow_api = OrderFlowApi::new(db.clone(), checkout_config, producers.clone());
        let verifier = TokenVerifier::new(&auth_config);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfs::access_log"))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(verifier));
        // Everything under /api shares the token middleware. Requests without a token pass through
        // unauthenticated so the public product reads keep working; the claims extractor and the ACL
        // middleware turn away the routes that need more.
        let api_scope = web::scope("/api")
            .wrap(AuthTokenMiddlewareFactory::new())
            .service(CartRoute::<SqliteDatabase>::new())
            .service(AddToCartRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
