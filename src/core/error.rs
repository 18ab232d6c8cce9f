//! Typed error handling for the storefront API
//!
//! Every handler returns `Result<_, ApiError>`. The error knows its HTTP status
//! and renders itself as `{"error": "<message>"}`, which is the body shape the
//! frontend prototype expects for every failure.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: a required parameter is missing or the body is malformed (400)
//! - [`NotFoundError`]: the referenced product, cart item or record is absent (404)
//! - [`StoreError`]: the backing document could not be read or written (500)

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type returned by route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced resource does not exist
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a stable error code, used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Store(_) => "STORE_ERROR",
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised before any store access when the request is incomplete
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required query or body parameter is absent
    #[error("{name} is required")]
    MissingParameter { name: String },

    /// `name_like` is absent or blank on a name search
    #[error("Name query parameter is required")]
    MissingNameQuery,

    /// The request body is not usable JSON for this route
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// The query string could not be decoded
    #[error("Invalid query string: {message}")]
    InvalidQuery { message: String },
}

impl ValidationError {
    pub fn missing(name: &str) -> Self {
        ValidationError::MissingParameter {
            name: name.to_string(),
        }
    }
}

// =============================================================================
// Not Found Errors
// =============================================================================

/// Errors raised when a referenced item is absent from the store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Product not found")]
    Product,

    #[error("Product not found in cart")]
    CartItem,

    #[error("Collection '{collection}' not found")]
    Collection { collection: String },

    #[error("Record '{id}' not found in '{collection}'")]
    Record { collection: String, id: String },
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by record store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing document is not valid JSON
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing document is valid JSON but not an object of collections
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A lock guarding the document was poisoned by a panicking writer
    #[error("Store lock poisoned: {0}")]
    Poisoned(String),
}
