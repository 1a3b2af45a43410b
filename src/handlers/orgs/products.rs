use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateProduct, Product, UpdateProduct};

use super::{OrgItemPath, OrgPath};

pub async fn create_product(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Json(input): Json<CreateProduct>,
) -> Result<Json<Product>> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    if input.max_activations < 1 {
        return Err(AppError::BadRequest(
            "Max activations must be at least 1".into(),
        ));
    }

    let conn = state.db.get()?;
    let product = queries::create_product(&conn, &path.org_id, &input)?;

    tracing::info!("Created product {} (org: {})", product.id, path.org_id);
    Ok(Json(product))
}

pub async fn list_products(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
) -> Result<Json<Vec<Product>>> {
    let conn = state.db.get()?;
    let products = queries::list_products_for_org(&conn, &path.org_id)?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    let product = queries::get_product_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if product.org_id != path.org_id {
        return Err(AppError::NotFound("Product not found".into()));
    }

    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;

    let existing = queries::get_product_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    if existing.org_id != path.org_id {
        return Err(AppError::NotFound("Product not found".into()));
    }

    queries::update_product(&conn, &path.id, &input)?;

    let product = queries::get_product_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::Internal("Product not found after update".into()))?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let existing = queries::get_product_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    if existing.org_id != path.org_id {
        return Err(AppError::NotFound("Product not found".into()));
    }

    queries::delete_product(&conn, &path.id)?;

    tracing::info!("Deleted product {} (org: {})", path.id, path.org_id);
    Ok(Json(serde_json::json!({ "deleted": true })))
}
