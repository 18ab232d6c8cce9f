//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use storefront::server::ServerBuilder;
use storefront::storage::InMemoryStore;

/// Catalogue covering every band, both band boundaries and odd records
pub fn catalogue() -> Value {
    json!({
        "products": [
            {"id": 1, "productId": "1", "name": "Galaxy A15", "category": "phone", "discounted_price": 500000},
            {"id": 2, "productId": "2", "name": "Galaxy S24", "category": "phone", "discounted_price": 2000000},
            {"id": 3, "productId": "3", "name": "Pixel Buds", "category": " Audio ", "discounted_price": 999999},
            {"id": 4, "productId": "4", "name": "iPad Air", "category": "tablet", "discounted_price": 1000000},
            {"id": 5, "productId": "5", "name": "MacBook Pro", "category": "laptop", "discounted_price": 5000000},
            {"id": 6, "productId": "6", "name": "ThinkPad X1", "category": "laptop", "discounted_price": 30000000},
            {"id": 7, "productId": "7", "name": "Galaxy Tab", "category": "tablet", "discounted_price": 4999999},
            {"id": 8, "productId": "8", "name": "Mystery Box", "category": "misc"},
            {"id": 9, "productId": "9", "name": "Cable", "category": 42, "discounted_price": 300000},
            {"id": 10, "productId": "10", "name": "Charger", "discounted_price": 100000}
        ],
        "cart": [
            {"id": 1, "productId": "2", "quantity": 1},
            {"id": 2, "productId": "5", "quantity": 2}
        ]
    })
}

/// Two-product catalogue used by the documented examples
pub fn phones() -> Value {
    json!({
        "products": [
            {"id": 1, "productId": "1", "discounted_price": 500000, "category": "phone"},
            {"id": 2, "productId": "2", "discounted_price": 2000000, "category": "phone"}
        ],
        "cart": []
    })
}

pub fn make_server(document: Value) -> TestServer {
    let store = InMemoryStore::from_document(document).unwrap();
    let app = ServerBuilder::new().with_store(store).build().unwrap();
    TestServer::try_new(app).unwrap()
}

/// `id` values of a JSON array, in order
pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|record| record["id"].as_i64().unwrap())
        .collect()
}
