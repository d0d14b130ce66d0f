use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::db::CategoryPayload;
use crate::error::{AppError, DatabaseError};
use crate::AppState;

const MISSING_FIELDS: &str = "category_name and description are required";

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i32,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn parse_category_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>().map_err(|_| {
        warn!(id = %raw, "Invalid category ID format");
        AppError::Validation("Invalid category ID".to_string())
    })
}

fn validate_payload(payload: &CategoryPayload) -> Result<(), AppError> {
    if payload.is_complete() {
        return Ok(());
    }
    warn!(
        name = %payload.name,
        description = %payload.description,
        "Missing required fields"
    );
    Err(AppError::Validation(MISSING_FIELDS.to_string()))
}

/// Maps a store failure to the response the client sees. Unexpected
/// failures are logged here and replaced by `failure_message`.
fn store_failure(err: DatabaseError, failure_message: &str) -> AppError {
    match err {
        DatabaseError::NotFound => AppError::NotFound("Category not found".to_string()),
        DatabaseError::Duplicate(message) => AppError::Conflict(message),
        other => {
            error!(error = %other, "{}", failure_message);
            AppError::Internal(failure_message.to_string())
        }
    }
}

/// `GET /api/categories`, or a single lookup when `?name=` is given.
pub async fn list_categories(
    query: web::Query<CategoryQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(name) = query.into_inner().name {
        info!(category_name = %name, "GET /api/categories?name - Getting category by name");
        let category = state
            .store
            .get_category_by_name(&name)
            .await
            .map_err(|e| store_failure(e, "Failed to get that category"))?;
        return Ok(HttpResponse::Ok().json(category));
    }

    info!("GET /api/categories - Getting all of the categories");
    let categories = state
        .store
        .list_categories()
        .await
        .map_err(|e| store_failure(e, "Failed to get categories"))?;

    info!(count = categories.len(), "Successfully retrieved categories");
    Ok(HttpResponse::Ok().json(categories))
}

pub async fn get_category(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_category_id(&path)?;
    info!(category_id = id, "GET /api/categories/{{id}} - Getting category by ID");

    let category = state
        .store
        .get_category_by_id(id)
        .await
        .map_err(|e| store_failure(e, "Failed to get that category"))?;

    info!(category_id = id, "Successfully retrieved the category");
    Ok(HttpResponse::Ok().json(category))
}

pub async fn create_category(
    body: web::Json<CategoryPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();
    info!(
        category_name = %payload.name,
        description = %payload.description,
        "Creating category with data"
    );
    validate_payload(&payload)?;

    let id = state
        .store
        .create_category(&payload.name, &payload.description)
        .await
        .map_err(|e| store_failure(e, "Failed to create new category"))?;

    info!(category_id = id, category_name = %payload.name, "Successfully created new category");
    Ok(HttpResponse::Ok().json(CreatedResponse {
        id,
        message: "Category created successfully",
    }))
}

pub async fn update_category(
    path: web::Path<String>,
    body: web::Json<CategoryPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_category_id(&path)?;
    let payload = body.into_inner();
    info!(
        category_id = id,
        category_name = %payload.name,
        description = %payload.description,
        "PUT /api/categories/{{id}} - Updating category"
    );
    validate_payload(&payload)?;

    state
        .store
        .update_category(id, &payload.name, &payload.description)
        .await
        .map_err(|e| store_failure(e, "Failed to update the category"))?;

    info!(category_id = id, category_name = %payload.name, "Successfully updated the category");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Category was updated successfully",
    }))
}

pub async fn delete_category(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_category_id(&path)?;
    info!(category_id = id, "DELETE /api/categories/{{id}} - Deleting category");

    state
        .store
        .delete_category(id)
        .await
        .map_err(|e| store_failure(e, "Failed to delete the category"))?;

    info!(category_id = id, "Successfully deleted the category");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Category was successfully deleted",
    }))
}
