//! HTTP handlers
//!
//! Handlers are thin: parse and validate parameters, take a snapshot or apply
//! one store mutation, call the query engine, shape the response. Validation
//! always happens before the store is touched.

pub mod cart;
pub mod catalog;
pub mod records;

use crate::core::error::ValidationError;
use crate::core::query::PageParams;
use crate::core::record::{CART, PRODUCTS, PRODUCT_ID, Record};
use crate::core::store::RecordStore;
use crate::core::ApiError;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Query};
use axum::http::HeaderName;
use axum::http::request::Parts;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Response header carrying the unpaginated result count
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Snapshot of the product catalogue (empty when the collection is missing)
    pub async fn products(&self) -> Result<Vec<Record>, ApiError> {
        Ok(self.store.snapshot(PRODUCTS).await?.unwrap_or_default())
    }

    /// Snapshot of the cart (empty when the collection is missing)
    pub async fn cart(&self) -> Result<Vec<Record>, ApiError> {
        Ok(self.store.snapshot(CART).await?.unwrap_or_default())
    }
}

/// Raw query-string pairs in request order
///
/// Repeated keys keep every value; single-valued parameters read the first
/// one. Undecodable query strings are rejected as a [`ValidationError`].
#[derive(Debug, Clone, Default)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    /// First value given for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// First value for `key`, owned
    pub fn first_owned(&self, key: &str) -> Option<String> {
        self.first(key).map(str::to_string)
    }

    /// `_page` / `_limit` pagination parameters
    pub fn paging(&self) -> PageParams {
        PageParams {
            page: self.first_owned("_page"),
            limit: self.first_owned("_limit"),
        }
    }

    /// `?productId=`, or a validation error when absent or empty
    pub fn product_id(&self) -> Result<&str, ValidationError> {
        self.first(PRODUCT_ID)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ValidationError::missing(PRODUCT_ID))
    }
}

impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(
            |rejection| ValidationError::InvalidQuery {
                message: rejection.body_text(),
            },
        )?;
        Ok(QueryPairs(pairs))
    }
}

/// Confirmation body for delete routes
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: String,
}

/// Parse a request body as JSON; an empty body is `null`
pub(crate) fn parse_body(body: &Bytes) -> Result<Value, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ValidationError::InvalidBody {
        message: e.to_string(),
    })
}

/// Parse a request body that must be a JSON object
pub(crate) fn parse_object_body(body: &Bytes) -> Result<Map<String, Value>, ValidationError> {
    match parse_body(body)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(ValidationError::InvalidBody {
            message: "expected a JSON object".to_string(),
        }),
    }
}

/// GET /echo
///
/// Returns the query string as a JSON object; repeated keys become arrays.
pub async fn echo(QueryPairs(pairs): QueryPairs) -> Json<Map<String, Value>> {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }

    let echoed = grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::from(values)
            };
            (key, value)
        })
        .collect();

    Json(echoed)
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "storefront-mock"
    }))
}
