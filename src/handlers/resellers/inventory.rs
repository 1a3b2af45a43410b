use axum::extract::State;
use serde::Deserialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::handlers::{ListQuery, Paginated, filtered_page};
use crate::models::{CreateInventoryLine, InventoryLine, UpdateInventoryLine};

use super::{ResellerItemPath, ResellerPath};

/// Most units a single stock purchase may add.
const MAX_STOCK_QUANTITY: i32 = 10_000;

/// POST /resellers/{reseller_id}/inventory
/// Open a stock line for a product; `quantity` keys are generated into the
/// pool up front.
pub async fn create_inventory(
    State(state): State<AppState>,
    Path(path): Path<ResellerPath>,
    Json(input): Json<CreateInventoryLine>,
) -> Result<Json<InventoryLine>> {
    if input.quantity < 1 || input.quantity > MAX_STOCK_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "Quantity must be between 1 and {}",
            MAX_STOCK_QUANTITY
        )));
    }

    let conn = state.db.get()?;

    let reseller = queries::get_reseller_by_id(&conn, &path.reseller_id)?
        .ok_or_else(|| AppError::NotFound("Reseller not found".into()))?;

    // The product must belong to the org this reseller sells for
    let product = queries::get_product_by_id(&conn, &input.product_id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    if product.org_id != reseller.org_id {
        return Err(AppError::NotFound("Product not found".into()));
    }

    let line =
        queries::create_inventory_line(&conn, &path.reseller_id, &product.key_prefix, &input)?;

    tracing::info!(
        "Opened inventory line {} ({} unit(s) of {}) for reseller {}",
        line.id,
        input.quantity,
        product.name,
        path.reseller_id
    );
    Ok(Json(line))
}

pub async fn list_inventory(
    State(state): State<AppState>,
    Path(path): Path<ResellerPath>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<InventoryLine>>> {
    let conn = state.db.get()?;
    let lines = queries::list_inventory_for_reseller(&conn, &path.reseller_id)?;
    Ok(Json(filtered_page(&lines, &query, |line| {
        vec![line.product_id.as_str()]
    })))
}

pub async fn update_inventory(
    State(state): State<AppState>,
    Path(path): Path<ResellerItemPath>,
    Json(input): Json<UpdateInventoryLine>,
) -> Result<Json<InventoryLine>> {
    let conn = state.db.get()?;

    let existing = queries::get_inventory_line_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Inventory line not found".into()))?;
    if existing.reseller_id != path.reseller_id {
        return Err(AppError::NotFound("Inventory line not found".into()));
    }

    queries::update_inventory_line(&conn, &path.id, &input)?;

    let line = queries::get_inventory_line_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::Internal("Inventory line not found after update".into()))?;
    Ok(Json(line))
}

pub async fn delete_inventory(
    State(state): State<AppState>,
    Path(path): Path<ResellerItemPath>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let existing = queries::get_inventory_line_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Inventory line not found".into()))?;
    if existing.reseller_id != path.reseller_id {
        return Err(AppError::NotFound("Inventory line not found".into()));
    }

    queries::delete_inventory_line(&conn, &path.id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct RestockBody {
    pub quantity: i32,
}

/// POST /resellers/{reseller_id}/inventory/{id}/restock
pub async fn restock_inventory(
    State(state): State<AppState>,
    Path(path): Path<ResellerItemPath>,
    Json(body): Json<RestockBody>,
) -> Result<Json<InventoryLine>> {
    if body.quantity < 1 || body.quantity > MAX_STOCK_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "Quantity must be between 1 and {}",
            MAX_STOCK_QUANTITY
        )));
    }

    let mut conn = state.db.get()?;

    let existing = queries::get_inventory_line_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Inventory line not found".into()))?;
    if existing.reseller_id != path.reseller_id {
        return Err(AppError::NotFound("Inventory line not found".into()));
    }

    let product = queries::get_product_by_id(&conn, &existing.product_id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let line =
        queries::restock_inventory_line(&mut conn, &path.id, &product.key_prefix, body.quantity)?;

    tracing::info!(
        "Restocked inventory line {} with {} unit(s) (reseller: {})",
        path.id,
        body.quantity,
        path.reseller_id
    );
    Ok(Json(line))
}
