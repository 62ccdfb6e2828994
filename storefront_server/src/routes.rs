//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will
//! cause the current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database
//! work and so on) must therefore be expressed as a future and awaited, so that worker threads keep serving
//! other requests in the meantime.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    db_types::{NewProduct, ProductUpdate, Role},
    traits::{CartManagement, CatalogManagement, StorefrontDatabase},
    CartApi,
    CatalogApi,
    OrderFlowApi,
};

use crate::{
    auth::UserClaims,
    data_objects::{AddToCartRequest, CheckoutRequest, JsonResponse, UpdateCartItemRequest, UpdateStatusRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so the `route!` macro generates a concrete `HttpServiceFactory`
// wrapper struct per route, parameterised over the backend type.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>); }
        paste::paste! {
            impl<B> [<$name:camel Route>]<B> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(core::marker::PhantomData)
                }
            }
        }
        paste::paste! {
            impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
            where B: $($bounds +)+ 'static
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<B>);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>); }
        paste::paste! {
            impl<B> [<$name:camel Route>]<B> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(core::marker::PhantomData)
                }
            }
        }
        paste::paste! {
            impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
            where B: $($bounds +)+ 'static
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<B>)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------

route!(cart => Get "/cart" impl CartManagement, CatalogManagement);
/// Route handler for the cart endpoint
///
/// Returns the caller's cart with lines resolved against the live catalog and totals from the pricing engine.
/// A user's first call creates their (empty) cart. Every cart route answers with this same shape.
pub async fn cart<B>(claims: UserClaims, api: web::Data<CartApi<B>>) -> Result<HttpResponse, ServerError>
where B: CartManagement + CatalogManagement {
    debug!("💻️ GET cart for {}", claims.user_id);
    let view = api.view(&claims.user_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

route!(add_to_cart => Post "/cart" impl CartManagement, CatalogManagement);
/// Route handler for adding an item to the cart
///
/// Adding a product that is already in the cart merges the quantities. A missing quantity means 1.
pub async fn add_to_cart<B>(
    claims: UserClaims,
    body: web::Json<AddToCartRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CartManagement + CatalogManagement,
{
    let AddToCartRequest { product_id, quantity } = body.into_inner();
    debug!("💻️ POST cart for {}: product {product_id} x{:?}", claims.user_id, quantity);
    let view = api.add_item(&claims.user_id, product_id, quantity).await?;
    Ok(HttpResponse::Ok().json(view))
}

route!(update_cart_item => Put "/cart/{product_id}" impl CartManagement, CatalogManagement);
/// Route handler for replacing a cart line's quantity. A quantity of zero or less removes the line.
pub async fn update_cart_item<B>(
    claims: UserClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateCartItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CartManagement + CatalogManagement,
{
    let product_id = path.into_inner();
    debug!("💻️ PUT cart item {product_id} for {}", claims.user_id);
    let view = api.update_item(&claims.user_id, product_id, body.quantity).await?;
    Ok(HttpResponse::Ok().json(view))
}

route!(remove_cart_item => Delete "/cart/{product_id}" impl CartManagement, CatalogManagement);
pub async fn remove_cart_item<B>(
    claims: UserClaims,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CartManagement + CatalogManagement,
{
    let product_id = path.into_inner();
    debug!("💻️ DELETE cart item {product_id} for {}", claims.user_id);
    let view = api.remove_item(&claims.user_id, product_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

route!(clear_cart => Delete "/cart" impl CartManagement, CatalogManagement);
pub async fn clear_cart<B>(claims: UserClaims, api: web::Data<CartApi<B>>) -> Result<HttpResponse, ServerError>
where B: CartManagement + CatalogManagement {
    debug!("💻️ DELETE cart for {}", claims.user_id);
    let view = api.clear(&claims.user_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(create_order => Post "/orders" impl StorefrontDatabase);
/// Route handler for checkout
///
/// Converts the caller's cart into an order: the engine snapshots the resolved lines, computes the totals and
/// clears the cart in one transaction. An empty cart is refused with 400 and nothing is created.
pub async fn create_order<B>(
    claims: UserClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
{
    debug!("💻️ POST orders for {}", claims.user_id);
    let receipt = api.checkout(&claims.user_id, body.into_inner().customer).await?;
    Ok(HttpResponse::Created().json(receipt))
}

route!(my_orders => Get "/orders" impl StorefrontDatabase);
/// Route handler for the orders listing
///
/// Users see their own orders, newest first. Admins see every order in the store.
pub async fn my_orders<B>(claims: UserClaims, api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError>
where B: StorefrontDatabase {
    debug!("💻️ GET orders for {}", claims.user_id);
    let orders = if claims.is_admin() { api.all_orders().await? } else { api.orders_for_user(&claims.user_id).await? };
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl StorefrontDatabase);
/// Route handler for a single order
///
/// Only the order's owner or an admin may read it.
pub async fn order_by_id<B>(
    claims: UserClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
{
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id} for {}", claims.user_id);
    let details =
        api.order_details(order_id).await?.ok_or_else(|| ServerError::NoRecordFound("Order not found".to_string()))?;
    if details.order.user_id != claims.user_id && !claims.is_admin() {
        debug!("💻️ {} may not view order #{order_id}", claims.user_id);
        return Err(ServerError::InsufficientPermissions("Not authorized to view this order".to_string()));
    }
    Ok(HttpResponse::Ok().json(details))
}

route!(update_order_status => Put "/orders/{id}/status" impl StorefrontDatabase where requires [Role::Admin]);
/// Route handler for advancing an order's fulfilment status. Admin only.
///
/// Setting `delivered` stamps the order's `delivered_at` timestamp. Under the strict-transition policy an
/// illegal move (say, delivered back to pending) is refused with 400.
pub async fn update_order_status<B>(
    claims: UserClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
{
    let order_id = path.into_inner();
    let status = body.status;
    debug!("💻️ PUT order #{order_id} status to {status} by {}", claims.user_id);
    let order = api.update_status(order_id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Products  ----------------------------------------------------

route!(products => Get "/products" impl CatalogManagement);
/// Route handler for the public product list.
pub async fn products<B>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    trace!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CatalogManagement);
pub async fn product_by_id<B>(path: web::Path<i64>, api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let product_id = path.into_inner();
    trace!("💻️ GET product #{product_id}");
    let product = api
        .product_by_id(product_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound("Product not found".to_string()))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl CatalogManagement where requires [Role::Admin]);
pub async fn create_product<B>(
    claims: UserClaims,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
{
    debug!("💻️ POST products by {}", claims.user_id);
    let product = api.create_product(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Put "/products/{id}" impl CatalogManagement where requires [Role::Admin]);
pub async fn update_product<B>(
    claims: UserClaims,
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
{
    let product_id = path.into_inner();
    debug!("💻️ PUT product #{product_id} by {}", claims.user_id);
    let product = api
        .update_product(product_id, body.into_inner())
        .await?
        .ok_or_else(|| ServerError::NoRecordFound("Product not found".to_string()))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl CatalogManagement where requires [Role::Admin]);
pub async fn delete_product<B>(
    claims: UserClaims,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
{
    let product_id = path.into_inner();
    debug!("💻️ DELETE product #{product_id} by {}", claims.user_id);
    if !api.delete_product(product_id).await? {
        return Err(ServerError::NoRecordFound("Product not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("Product removed")))
}
