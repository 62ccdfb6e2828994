use actix_web::{http::StatusCode, web, web::ServiceConfig};
use storefront_engine::CatalogApi;

use super::{
    helpers::{admin_token, delete_request, get_request, post_request, user_token},
    mocks::{sample_product, MockStorefront},
};
use crate::routes::{CreateProductRoute, DeleteProductRoute, ProductByIdRoute, ProductsRoute, UpdateProductRoute};

fn catalog_api(db: MockStorefront) -> web::Data<CatalogApi<MockStorefront>> {
    web::Data::new(CatalogApi::new(db))
}

fn register_routes(cfg: &mut ServiceConfig) {
    cfg.service(ProductsRoute::<MockStorefront>::new())
        .service(ProductByIdRoute::<MockStorefront>::new())
        .service(CreateProductRoute::<MockStorefront>::new())
        .service(UpdateProductRoute::<MockStorefront>::new())
        .service(DeleteProductRoute::<MockStorefront>::new());
}

#[actix_web::test]
async fn the_product_list_is_public() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products", configure_catalog).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let products: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(products.as_array().unwrap().len(), 2);
    assert_eq!(products[0]["title"], "Walnut standing desk");
}

#[actix_web::test]
async fn a_single_product_is_public() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products/1", configure_catalog).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let product: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["price"], 1000.0);
}

#[actix_web::test]
async fn a_missing_product_is_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products/99", configure_missing).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Product not found"}"#);
}

#[actix_web::test]
async fn product_writes_require_the_admin_role() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({"title": "Desk mat", "price": 19.99});
    let err = post_request(&user_token("user-alice"), "/products", body.clone(), configure_create)
        .await
        .expect_err("Expected the ACL to turn the request away");
    assert_eq!(err, "Insufficient permissions.");

    let (status, created) = post_request(&admin_token(), "/products", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let product: serde_json::Value = serde_json::from_str(&created).unwrap();
    assert_eq!(product["id"], 7);
}

#[actix_web::test]
async fn invalid_product_data_is_rejected() {
    let _ = env_logger::try_init().ok();
    // Discount outside [0, 100] never reaches the store
    let body = serde_json::json!({"title": "Desk mat", "price": 19.99, "discount": 150});
    let (status, response) =
        post_request(&admin_token(), "/products", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.contains("Discount must be between 0 and 100"), "unexpected body: {response}");
}

#[actix_web::test]
async fn deleting_a_missing_product_is_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, _body) = delete_request(&admin_token(), "/products/99", configure_missing).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_catalog(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_fetch_products()
        .returning(|| Ok(vec![sample_product(1, "Walnut standing desk", 100_000, 10), sample_product(2, "Desk lamp", 50_000, 0)]));
    db.expect_fetch_product().returning(|id| Ok(Some(sample_product(id, "Walnut standing desk", 100_000, 10))));
    register_routes(cfg);
    cfg.app_data(catalog_api(db));
}

fn configure_missing(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_fetch_product().returning(|_| Ok(None));
    db.expect_delete_product().returning(|_| Ok(false));
    register_routes(cfg);
    cfg.app_data(catalog_api(db));
}

fn configure_create(cfg: &mut ServiceConfig) {
    let mut db = MockStorefront::new();
    db.expect_create_product().returning(|new| {
        let mut product = sample_product(7, &new.title, new.price.cents(), new.discount);
        product.stock = new.stock;
        Ok(product)
    });
    register_routes(cfg);
    cfg.app_data(catalog_api(db));
}
