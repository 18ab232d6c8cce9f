//! # storefront-mock
//!
//! Mock storefront backend serving a product catalogue and a shopping cart
//! from a single JSON document on disk.
//!
//! ## Features
//!
//! - **Price bands**: products under 1M, from 1M to 5M and over 5M, with
//!   optional category filter and pagination
//! - **Name search**: case-insensitive substring match on product names
//! - **Cart edits**: quantity updates and removals keyed by `productId`
//! - **Generic collections**: list, filter, sort, paginate and CRUD for every
//!   top-level array in the document
//! - **Durable writes**: every accepted mutation is persisted before replying
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_store(JsonFileStore::open("db.json")?)
//!     .build()?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiError, ListQuery, NameQuery, NotFoundError, Page, PageParams, PaginationMeta,
        PriceBand, Record, RecordStore, StoreError, ValidationError,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryStore, JsonFileStore};

    // === Config ===
    pub use crate::config::ServerConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
}
