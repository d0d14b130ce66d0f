//! Persistence for the `categories` table.
//!
//! Handlers talk to [`CategoryStore`]; [`DbOperations`] is the PostgreSQL
//! implementation used in production.

pub mod models;
pub mod operations;
pub mod store;

pub use models::{Category, CategoryPayload};
pub use operations::DbOperations;
pub use store::CategoryStore;
