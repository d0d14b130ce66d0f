use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::models::Category;
use crate::db::store::CategoryStore;
use crate::error::DatabaseError;

pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    /// Opens the pool and pings one connection so an unreachable database
    /// fails here instead of on the first request.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        conn.ping()
            .await
            .map_err(|e| DatabaseError::ConnectionError(format!("failed to ping database: {}", e)))?;

        info!("Database successfully connected");
        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>, DatabaseError> {
        Ok(self.pool.as_ref().begin().await?)
    }

    async fn delete_category_with_transaction(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Postgres>,
    ) -> Result<(), DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut **transaction)
        .await?;

        if !exists {
            return Err(DatabaseError::NotFound);
        }

        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        if result.rows_affected() != 1 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }
}

fn duplicate_name(err: DatabaseError, name: &str) -> DatabaseError {
    match err {
        DatabaseError::Duplicate(_) => {
            DatabaseError::Duplicate(format!("category '{}' already exists", name))
        }
        other => other,
    }
}

// Northwind declares `category_id` as `smallint`. It is widened to `int4` in
// every select so rows decode into `Category::id` on either column type.
#[async_trait]
impl CategoryStore for DbOperations {
    async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT category_id::int4 AS category_id, category_name, description FROM categories",
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| DatabaseError::QueryError(format!("failed to query categories: {}", e)))?;

        Ok(categories)
    }

    async fn get_category_by_id(&self, id: i32) -> Result<Category, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT category_id::int4 AS category_id, category_name, description FROM categories WHERE category_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        category.ok_or(DatabaseError::NotFound)
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Category, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT category_id::int4 AS category_id, category_name, description FROM categories WHERE category_name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        category.ok_or(DatabaseError::NotFound)
    }

    async fn create_category(&self, name: &str, description: &str) -> Result<i32, DatabaseError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO categories (category_name, description)
            VALUES ($1, $2)
            RETURNING category_id::int4
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| duplicate_name(e.into(), name))?;

        Ok(id)
    }

    async fn update_category(&self, id: i32, name: &str, description: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE categories SET category_name = $1, description = $2 WHERE category_id = $3",
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| duplicate_name(e.into(), name))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }

    async fn delete_category(&self, id: i32) -> Result<(), DatabaseError> {
        let mut transaction = self.begin_transaction().await?;

        let result = self.delete_category_with_transaction(id, &mut transaction).await;

        match result {
            Ok(()) => {
                transaction.commit().await?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = transaction.rollback().await {
                    warn!(error = %rollback_err, category_id = id, "Failed to roll back delete");
                }
                Err(e)
            }
        }
    }
}
