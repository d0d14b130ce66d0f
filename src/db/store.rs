use async_trait::async_trait;

use crate::db::models::Category;
use crate::error::DatabaseError;

/// One operation per REST action on categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All rows in storage order.
    async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError>;

    async fn get_category_by_id(&self, id: i32) -> Result<Category, DatabaseError>;

    /// Exact-match lookup on `category_name`.
    async fn get_category_by_name(&self, name: &str) -> Result<Category, DatabaseError>;

    /// Inserts a row and returns the id the database generated for it.
    async fn create_category(&self, name: &str, description: &str) -> Result<i32, DatabaseError>;

    async fn update_category(&self, id: i32, name: &str, description: &str) -> Result<(), DatabaseError>;

    async fn delete_category(&self, id: i32) -> Result<(), DatabaseError>;
}
