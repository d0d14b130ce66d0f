#![allow(dead_code)]

use async_trait::async_trait;
use northwind_api::server::build_app;
use northwind_api::middleware::Cors;
use northwind_api::{AppState, Category, CategoryStore, DatabaseError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::Dispatch;

pub const ALLOWED_ORIGIN: &str = "https://allowed.example";

/// Keeps rows in memory and enforces unique names, like a `categories`
/// table with `UNIQUE (category_name)`.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<BTreeMap<i32, Category>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        self.touch();
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn get_category_by_id(&self, id: i32) -> Result<Category, DatabaseError> {
        self.touch();
        self.rows.lock().unwrap().get(&id).cloned().ok_or(DatabaseError::NotFound)
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Category, DatabaseError> {
        self.touch();
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|c| c.name == name)
            .cloned()
            .ok_or(DatabaseError::NotFound)
    }

    async fn create_category(&self, name: &str, description: &str) -> Result<i32, DatabaseError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|c| c.name == name) {
            return Err(DatabaseError::Duplicate(format!("category '{}' already exists", name)));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        rows.insert(id, Category::new(id, name, description));
        Ok(id)
    }

    async fn update_category(&self, id: i32, name: &str, description: &str) -> Result<(), DatabaseError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(row) => {
                row.name = name.to_string();
                row.description = description.to_string();
                Ok(())
            }
            None => Err(DatabaseError::NotFound),
        }
    }

    async fn delete_category(&self, id: i32) -> Result<(), DatabaseError> {
        self.touch();
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DatabaseError::NotFound)
    }
}

/// Panics on every list call.
pub struct PanickingStore;

#[async_trait]
impl CategoryStore for PanickingStore {
    async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        panic!("storage layer blew up")
    }

    async fn get_category_by_id(&self, _id: i32) -> Result<Category, DatabaseError> {
        Err(DatabaseError::NotFound)
    }

    async fn get_category_by_name(&self, _name: &str) -> Result<Category, DatabaseError> {
        Err(DatabaseError::NotFound)
    }

    async fn create_category(&self, _name: &str, _description: &str) -> Result<i32, DatabaseError> {
        Err(DatabaseError::QueryError("read only".to_string()))
    }

    async fn update_category(&self, _id: i32, _name: &str, _description: &str) -> Result<(), DatabaseError> {
        Err(DatabaseError::NotFound)
    }

    async fn delete_category(&self, _id: i32) -> Result<(), DatabaseError> {
        Err(DatabaseError::NotFound)
    }
}

pub fn app_with(
    store: Arc<dyn CategoryStore>,
    dispatch: Dispatch,
) -> actix_web::App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    build_app(AppState::new(store), dispatch, Cors::new([ALLOWED_ORIGIN]))
}
