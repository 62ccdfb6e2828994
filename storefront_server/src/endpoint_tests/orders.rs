use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use storefront_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    traits::CheckoutApiError,
    CheckoutConfig,
    OrderFlowApi,
};

use super::{
    helpers::{admin_token, get_request, post_request, put_request, user_token},
    mocks::{sample_customer, sample_items, sample_order, MockStorefront},
};
use crate::routes::{CreateOrderRoute, MyOrdersRoute, OrderByIdRoute, UpdateOrderStatusRoute};

fn flow_api(db: MockStorefront) -> web::Data<OrderFlowApi<MockStorefront>> {
    web::Data::new(OrderFlowApi::new(db, CheckoutConfig::default(), EventProducers::default()))
}

fn register_routes(cfg: &mut ServiceConfig) {
    cfg.service(CreateOrderRoute::<MockStorefront>::new())
        .service(MyOrdersRoute::<MockStorefront>::new())
        .service(OrderByIdRoute::<MockStorefront>::new())
        .service(UpdateOrderStatusRoute::<MockStorefront>::new());
}

fn checkout_body() -> serde_json::Value {
    serde_json::json!({ "customer": sample_customer() })
}

#[actix_web::test]
async fn checkout_with_an_empty_cart_is_refused() {
    let _ = env_logger::try_init().ok();
    let token = user_token("user-alice");
    let (status, body) =
        post_request(&token, "/orders", checkout_body(), configure_empty_cart).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Cart is empty"}"#);
}

#[actix_web::test]
async fn checkout_returns_the_full_receipt() {
    let _ = env_logger::try_init().ok();
    let token = user_token("user-alice");
    let (status, body) =
        post_request(&token, "/orders", checkout_body(), configure_checkout).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let receipt: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(receipt["status"], "pending");
    assert_eq!(receipt["subtotal"], 2300.0);
    assert_eq!(receipt["tax"], 230.0);
    assert_eq!(receipt["total"], 2530.0);
    assert_eq!(receipt["items"].as_array().unwrap().len(), 2);
    assert_eq!(receipt["customer"]["name"], "Alice Example");
}

#[actix_web::test]
async fn users_see_their_own_orders_and_admins_see_everything() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&user_token("user-alice"), "/orders", configure_listing).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, body) = get_request(&admin_token(), "/orders", configure_listing).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn another_users_order_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&user_token("user-alice"), "/orders/1", configure_bobs_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. Not authorized to view this order"}"#);
}

#[actix_web::test]
async fn admins_may_read_any_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&admin_token(), "/orders/1", configure_bobs_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["user_id"], "user-bob");
}

#[actix_web::test]
async fn a_missing_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&user_token("user-alice"), "/orders/99", configure_no_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Order not found"}"#);
}

#[actix_web::test]
async fn status_updates_require_the_admin_role() {
    let _ = env_logger::try_init().ok();
    let err = put_request(
        &user_token("user-alice"),
        "/orders/1/status",
        serde_json::json!({"status": "shipped"}),
        configure_status_update,
    )
    .await
    .expect_err("Expected the ACL to turn the request away");
    assert_eq!(err, "Insufficient permissions.");

    let err = put_request("", "/orders/1/status", serde_json::json!({"status": "shipped"}), configure_status_update)
        .await
        .expect_err("Expected the ACL to turn the request away");
    assert_eq!(err, "No access token supplied.");
}

#[actix_web::test]
async fn delivering_an_order_stamps_delivered_at() {
    let _ = env_logger::try_init().ok();
    let (status, body) = put_request(
        &admin_token(),
        "/orders/1/status",
        serde_json::json!({"status": "delivered"}),
        configure_status_update,
    )
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "delivered");
    assert!(order["delivered_at"].is_string(), "delivered_at must be stamped: {order}");
}

#[actix_web::test]
async fn illegal_transitions_are_refused_in_strict_mode() {
    let _ = env_logger::try_init().ok();
    let (status, body) = put_request(
        &admin_token(),
        "/orders/1/status",
        serde_json::json!({"status": "delivered"}),
        configure_pending_order,
    )
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Cannot change order status from pending to delivered"}"#);
}

fn configure_empty_cart(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_place_order().returning(|_, _, _, _| Err(CheckoutApiError::EmptyCart));
    register_routes(cfg);
    cfg.app_data(flow_api(db));
}

fn configure_checkout(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_place_order()
        .returning(|_, _, _, _| Ok((sample_order("user-alice", OrderStatusType::Pending), sample_items())));
    register_routes(cfg);
    cfg.app_data(flow_api(db));
}

fn configure_listing(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_fetch_orders_for_user().returning(|_| Ok(vec![sample_order("user-alice", OrderStatusType::Pending)]));
    db.expect_fetch_all_orders().returning(|| {
        Ok(vec![
            sample_order("user-alice", OrderStatusType::Pending),
            sample_order("user-bob", OrderStatusType::Shipped),
        ])
    });
    db.expect_fetch_order_items().returning(|_| Ok(sample_items()));
    register_routes(cfg);
    cfg.app_data(flow_api(db));
}

fn configure_bobs_order(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order("user-bob", OrderStatusType::Pending))));
    db.expect_fetch_order_items().returning(|_| Ok(sample_items()));
    register_routes(cfg);
    cfg.app_data(flow_api(db));
}

fn configure_no_order(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_fetch_order().returning(|_| Ok(None));
    register_routes(cfg);
    cfg.app_data(flow_api(db));
}

fn configure_status_update(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order("user-bob", OrderStatusType::Shipped))));
    db.expect_set_order_status().returning(|_, status| {
        let mut order = sample_order("user-bob", status);
        if status == OrderStatusType::Delivered {
            order.delivered_at = Some(Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap());
        }
        Ok(order)
    });
    register_routes(cfg);
    cfg.app_data(flow_api(db));
}

fn configure_pending_order(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order("user-bob", OrderStatusType::Pending))));
    register_routes(cfg);
    cfg.app_data(flow_api(db));
}
