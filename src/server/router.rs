//! Route table

use crate::core::record::{CART, PRODUCTS};
use crate::server::handlers::{AppState, cart, catalog, echo, health, records};
use axum::Router;
use axum::routing::get;

/// Build every API route
///
/// Static paths win over `/{collection}` captures, so the catalogue routes
/// and the custom `/products` and `/cart` methods take precedence over the
/// generic collection handlers:
///
/// - GET /echo, GET /health, GET /db
/// - GET /products/sortByPrice{Under1000K,From1mto5m,Over5m}[Page]
/// - GET /products/searchByName[Page]
/// - GET|POST|DELETE /products
/// - GET|POST|PUT|DELETE /cart
/// - GET|POST /{collection}
/// - GET|PUT|PATCH|DELETE /{collection}/{id}
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/echo", get(echo))
        .route("/health", get(health))
        .route("/db", get(records::document))
        .merge(catalog::catalog_routes())
        .route(
            "/products",
            records::collection_routes(PRODUCTS).delete(catalog::delete_product),
        )
        .route(
            "/cart",
            records::collection_routes(CART)
                .put(cart::update_cart)
                .delete(cart::remove_from_cart),
        )
        .route("/{collection}", get(records::list).post(records::create))
        .route(
            "/{collection}/{id}",
            get(records::get_one)
                .put(records::replace)
                .patch(records::patch)
                .delete(records::remove),
        )
        .with_state(state)
}
