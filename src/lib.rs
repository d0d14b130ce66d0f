pub mod categories;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod server;
pub mod telemetry;

use std::sync::Arc;

pub use error::{AppError, DatabaseError};
pub type Result<T> = std::result::Result<T, AppError>;
pub use crate::config::Settings;

pub use db::{Category, CategoryPayload, CategoryStore, DbOperations};

/// Application state shared across all workers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CategoryStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// Connects the PostgreSQL store described by `settings`.
    pub async fn connect(settings: &Settings) -> Result<(Self, Arc<DbOperations>)> {
        let url = settings.database_url()?;
        let db = Arc::new(DbOperations::connect(&url, settings.database_max_connections).await?);
        Ok((Self::new(db.clone()), db))
    }
}
