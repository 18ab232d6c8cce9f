//! Core module containing the record model, the store trait and the query engine

pub mod error;
pub mod listing;
pub mod query;
pub mod record;
pub mod store;

pub use error::{ApiError, NotFoundError, StoreError, ValidationError};
pub use listing::{ListQuery, Listing};
pub use query::{NameQuery, Page, PageParams, PaginationMeta, PriceBand};
pub use record::Record;
pub use store::{Predicate, RecordStore};
