//! Mutations through the HTTP routes reach the JSON file before the reply

use axum_test::TestServer;
use serde_json::{Value, json};
use storefront::server::ServerBuilder;
use storefront::storage::JsonFileStore;
use tempfile::TempDir;

fn seeded_server() -> (TempDir, std::path::PathBuf, TestServer) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        serde_json::to_vec_pretty(&json!({
            "products": [
                {"id": 1, "productId": "1", "name": "Galaxy A15", "discounted_price": 500000},
                {"id": 2, "productId": "2", "name": "Galaxy S24", "discounted_price": 2000000}
            ],
            "cart": [{"id": 1, "productId": "2", "quantity": 1}]
        }))
        .unwrap(),
    )
    .unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    let app = ServerBuilder::new().with_store(store).build().unwrap();
    (dir, path, TestServer::try_new(app).unwrap())
}

fn on_disk(path: &std::path::Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_cart_update_is_written() {
    let (_dir, path, server) = seeded_server();

    server
        .put("/cart")
        .add_query_param("productId", "2")
        .json(&json!({"quantity": 5}))
        .await
        .assert_status_ok();

    assert_eq!(on_disk(&path)["cart"][0]["quantity"], 5);
}

#[tokio::test]
async fn test_product_delete_is_written() {
    let (_dir, path, server) = seeded_server();

    server
        .delete("/products")
        .add_query_param("productId", "1")
        .await
        .assert_status_ok();

    let products = on_disk(&path)["products"].clone();
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["productId"], "2");
}

#[tokio::test]
async fn test_reopened_store_sees_created_record() {
    let (_dir, path, server) = seeded_server();

    server
        .post("/cart")
        .json(&json!({"productId": "1", "quantity": 2}))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
    drop(server);

    let store = JsonFileStore::open(&path).unwrap();
    let app = ServerBuilder::new().with_store(store).build().unwrap();
    let server = TestServer::try_new(app).unwrap();

    let cart: Value = server.get("/cart").await.json();
    assert_eq!(cart.as_array().unwrap().len(), 2);
    assert_eq!(cart[1]["id"], 2);
    assert!(cart[1]["createdAt"].is_i64());
}

#[tokio::test]
async fn test_rejected_request_leaves_file_untouched() {
    let (_dir, path, server) = seeded_server();
    let before = std::fs::read(&path).unwrap();

    server
        .put("/cart")
        .add_query_param("productId", "404")
        .json(&json!({"quantity": 5}))
        .await
        .assert_status_not_found();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_failed_write_is_not_served() {
    let (dir, path, server) = seeded_server();
    let before = std::fs::read(&path).unwrap();

    // Occupy the temp file's path so the write fails
    std::fs::create_dir(dir.path().join("db.json.tmp")).unwrap();

    let response = server
        .put("/cart")
        .add_query_param("productId", "2")
        .json(&json!({"quantity": 5}))
        .await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json::<Value>()["error"].is_string());

    let cart: Value = server.get("/cart").await.json();
    assert_eq!(cart[0]["quantity"], 1);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}
