//! HTTP handlers for the categories resource.

pub mod handlers;

pub use handlers::{
    create_category, delete_category, get_category, list_categories, update_category,
};
