use axum::extract::State;
use axum::response::Response;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::handlers::{ListQuery, Paginated, attachment, filtered_page};
use crate::listing;
use crate::models::{RecordSale, SaleTransaction};

use super::{ResellerItemPath, ResellerPath};

/// POST /resellers/{reseller_id}/sales
/// Record a sale: keys leave the pool, counters move, and the transaction
/// row is written — atomically.
pub async fn record_sale(
    State(state): State<AppState>,
    Path(path): Path<ResellerPath>,
    Json(input): Json<RecordSale>,
) -> Result<Json<SaleTransaction>> {
    if input.customer_name.trim().is_empty() || input.customer_email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Customer name and email are required".into(),
        ));
    }
    if input.quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let mut conn = state.db.get()?;

    let line = queries::get_inventory_line_by_id(&conn, &input.inventory_line_id)?
        .ok_or_else(|| AppError::NotFound("Inventory line not found".into()))?;
    if line.reseller_id != path.reseller_id {
        return Err(AppError::NotFound("Inventory line not found".into()));
    }

    let product = queries::get_product_by_id(&conn, &line.product_id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let sale = queries::record_sale(&mut conn, &path.reseller_id, &product.key_prefix, &input)?;

    tracing::info!(
        "Recorded sale {} of {} key(s) to {} (reseller: {})",
        sale.id,
        sale.quantity,
        sale.customer_email,
        path.reseller_id
    );
    Ok(Json(sale))
}

pub async fn list_sales(
    State(state): State<AppState>,
    Path(path): Path<ResellerPath>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<SaleTransaction>>> {
    let conn = state.db.get()?;
    let sales = queries::list_sales_for_reseller(&conn, &path.reseller_id)?;
    Ok(Json(filtered_page(&sales, &query, |sale| {
        vec![
            sale.customer_name.as_str(),
            sale.customer_email.as_str(),
            sale.status.as_ref(),
            sale.transaction_type.as_ref(),
        ]
    })))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(path): Path<ResellerItemPath>,
) -> Result<Json<SaleTransaction>> {
    let conn = state.db.get()?;
    let sale = queries::get_sale_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Transaction not found".into()))?;

    if sale.reseller_id != path.reseller_id {
        return Err(AppError::NotFound("Transaction not found".into()));
    }

    Ok(Json(sale))
}

/// DELETE /resellers/{reseller_id}/sales/{id}
/// Removes the transaction and reverses its inventory bookkeeping.
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(path): Path<ResellerItemPath>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.db.get()?;

    let deleted = queries::delete_sale(&mut conn, &path.reseller_id, &path.id)?;
    if !deleted {
        return Err(AppError::NotFound("Transaction not found".into()));
    }

    tracing::info!("Deleted sale {} (reseller: {})", path.id, path.reseller_id);
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /resellers/{reseller_id}/sales/export.csv
pub async fn export_sales_csv(
    State(state): State<AppState>,
    Path(path): Path<ResellerPath>,
) -> Result<Response> {
    let conn = state.db.get()?;
    let sales = queries::list_sales_for_reseller(&conn, &path.reseller_id)?;

    let rows: Vec<Vec<String>> = sales
        .iter()
        .map(|sale| {
            vec![
                sale.id.clone(),
                sale.customer_name.clone(),
                sale.customer_email.clone(),
                sale.product_id.clone(),
                sale.quantity.to_string(),
                sale.amount_cents.to_string(),
                sale.transaction_type.as_ref().to_string(),
                sale.status.as_ref().to_string(),
                sale.created_at.to_string(),
                sale.license_keys.join("; "),
            ]
        })
        .collect();

    let csv = listing::to_csv(
        &[
            "id",
            "customer_name",
            "customer_email",
            "product_id",
            "quantity",
            "amount_cents",
            "type",
            "status",
            "created_at",
            "license_keys",
        ],
        &rows,
    );

    Ok(attachment("text/csv; charset=utf-8", "sales.csv", csv))
}
