//! Generic collection routes
//!
//! Every top-level array of the document is a collection:
//!
//! ```text
//! GET    /db                       whole document
//! GET    /{collection}             list (see core::listing for operators)
//! POST   /{collection}             create, stamps createdAt
//! GET    /{collection}/{id}        fetch one
//! PUT    /{collection}/{id}        replace, keeps id
//! PATCH  /{collection}/{id}        shallow merge
//! DELETE /{collection}/{id}        remove
//! ```

use super::{AppState, QueryPairs, TOTAL_COUNT_HEADER, parse_object_body};
use crate::core::error::{ApiError, NotFoundError};
use crate::core::listing::ListQuery;
use crate::core::record::{self, CREATED_AT, Record};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use chrono::Utc;
use serde_json::{Value, json};

/// GET/POST handlers bound to a fixed collection
///
/// Used where a collection path also carries custom methods (`/products`,
/// `/cart`), since a static path shadows `/{collection}` for every method.
pub fn collection_routes(collection: &'static str) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, QueryPairs(pairs): QueryPairs| async move {
            list_collection(&state, collection, &pairs).await
        },
    )
    .post(move |State(state): State<AppState>, body: Bytes| async move {
        create_in(&state, collection, &body).await
    })
}

/// GET /db
pub async fn document(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.store.document().await?))
}

/// GET /{collection}
pub async fn list(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    QueryPairs(pairs): QueryPairs,
) -> Result<Response, ApiError> {
    list_collection(&state, &collection, &pairs).await
}

/// POST /{collection}
pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    create_in(&state, &collection, &body).await
}

/// GET /{collection}/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Record>, ApiError> {
    snapshot(&state, &collection)
        .await?
        .into_iter()
        .find(|r| record::field_equals(r, "id", &id))
        .map(Json)
        .ok_or_else(|| not_found(&collection, &id))
}

/// PUT /{collection}/{id}
pub async fn replace(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let replacement = parse_object_body(&body)?;
    ensure_collection(&state, &collection).await?;

    let matches = |r: &Record| record::field_equals(r, "id", &id);
    let replaced = state
        .store
        .replace(&collection, &matches, Value::Object(replacement))
        .await?
        .ok_or_else(|| not_found(&collection, &id))?;
    tracing::info!(collection = %collection, id = %id, "replaced record");

    Ok(Json(replaced))
}

/// PATCH /{collection}/{id}
pub async fn patch(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let mut fields = parse_object_body(&body)?;
    fields.remove("id");
    ensure_collection(&state, &collection).await?;

    let matches = |r: &Record| record::field_equals(r, "id", &id);
    let updated = state
        .store
        .update(&collection, &matches, fields)
        .await?
        .ok_or_else(|| not_found(&collection, &id))?;
    tracing::info!(collection = %collection, id = %id, "patched record");

    Ok(Json(updated))
}

/// DELETE /{collection}/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    ensure_collection(&state, &collection).await?;

    let matches = |r: &Record| record::field_equals(r, "id", &id);
    if state.store.remove(&collection, &matches).await? == 0 {
        return Err(not_found(&collection, &id));
    }
    tracing::info!(collection = %collection, id = %id, "deleted record");

    Ok(Json(json!({})))
}

async fn list_collection(
    state: &AppState,
    collection: &str,
    pairs: &[(String, String)],
) -> Result<Response, ApiError> {
    let records = snapshot(state, collection).await?;
    let listing = ListQuery::from_pairs(pairs).apply(records);

    Ok(match listing.total {
        Some(total) => (
            [(TOTAL_COUNT_HEADER, total.to_string())],
            Json(listing.records),
        )
            .into_response(),
        None => Json(listing.records).into_response(),
    })
}

async fn create_in(state: &AppState, collection: &str, body: &Bytes) -> Result<Response, ApiError> {
    let mut fields = parse_object_body(body)?;
    fields.insert(CREATED_AT.to_string(), json!(Utc::now().timestamp_millis()));

    let created = state.store.insert(collection, Value::Object(fields)).await?;
    tracing::info!(collection, id = ?created.get("id"), "created record");

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn snapshot(state: &AppState, collection: &str) -> Result<Vec<Record>, ApiError> {
    state.store.snapshot(collection).await?.ok_or_else(|| {
        NotFoundError::Collection {
            collection: collection.to_string(),
        }
        .into()
    })
}

async fn ensure_collection(state: &AppState, collection: &str) -> Result<(), ApiError> {
    snapshot(state, collection).await.map(|_| ())
}

fn not_found(collection: &str, id: &str) -> ApiError {
    NotFoundError::Record {
        collection: collection.to_string(),
        id: id.to_string(),
    }
    .into()
}
