//! Cart routes keyed by `?productId=`

use super::{AppState, Deleted, QueryPairs, parse_body};
use crate::core::error::{ApiError, NotFoundError, ValidationError};
use crate::core::record::{self, CART, PRODUCT_ID, Record};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use serde_json::Map;

/// Body returned after a quantity change
#[derive(Debug, Serialize)]
pub struct CartUpdated {
    pub message: String,

    /// The whole cart as it stood right after the change
    pub cart: Vec<Record>,
}

/// PUT /cart?productId= with body `{"quantity": n}`
///
/// Sets `quantity` on the first cart item referencing the product. The value
/// is stored as sent; `null`, `0`, `false` and `""` are rejected as missing.
pub async fn update_cart(
    State(state): State<AppState>,
    params: QueryPairs,
    body: Bytes,
) -> Result<Json<CartUpdated>, ApiError> {
    let product_id = params.product_id()?;
    let body = parse_body(&body)?;
    let quantity = body
        .get("quantity")
        .filter(|quantity| record::is_truthy(quantity))
        .cloned()
        .ok_or_else(|| ValidationError::missing("quantity"))?;

    let mut patch = Map::new();
    patch.insert("quantity".to_string(), quantity);

    let matches = |item: &Record| record::field_equals(item, PRODUCT_ID, product_id);
    let cart = state
        .store
        .update_and_list(CART, &matches, patch)
        .await?
        .ok_or(NotFoundError::CartItem)?;
    tracing::info!(product_id, "updated cart item");

    Ok(Json(CartUpdated {
        message: format!("Cart updated successfully for productId {}", product_id),
        cart,
    }))
}

/// DELETE /cart?productId=
pub async fn remove_from_cart(
    State(state): State<AppState>,
    params: QueryPairs,
) -> Result<Json<Deleted>, ApiError> {
    let product_id = params.product_id()?;
    let matches = |item: &Record| record::field_equals(item, PRODUCT_ID, product_id);

    let removed = state.store.remove(CART, &matches).await?;
    if removed == 0 {
        return Err(NotFoundError::CartItem.into());
    }
    tracing::info!(product_id, removed, "removed product from cart");

    Ok(Json(Deleted {
        message: format!(
            "Product with productId {} deleted from cart successfully",
            product_id
        ),
    }))
}
