//! HTTP server for the storefront API
//!
//! `ServerBuilder` wires a [`RecordStore`](crate::core::store::RecordStore)
//! into the route table in [`router`] and wraps it in the default middleware.

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
