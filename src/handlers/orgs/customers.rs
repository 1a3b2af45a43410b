use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::handlers::{ListQuery, Paginated, filtered_page};
use crate::models::{CreateCustomer, Customer, UpdateCustomer};

use super::{OrgItemPath, OrgPath};

pub async fn create_customer(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Json(input): Json<CreateCustomer>,
) -> Result<Json<Customer>> {
    if input.name.trim().is_empty() || input.email.trim().is_empty() {
        return Err(AppError::BadRequest("Name and email are required".into()));
    }

    let conn = state.db.get()?;
    let customer = queries::create_customer(&conn, &path.org_id, &input)?;
    Ok(Json(customer))
}

pub async fn list_customers(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Customer>>> {
    let conn = state.db.get()?;
    let customers = queries::list_customers_for_org(&conn, &path.org_id)?;
    Ok(Json(filtered_page(&customers, &query, |c| {
        vec![c.name.as_str(), c.email.as_str()]
    })))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
    Json(input): Json<UpdateCustomer>,
) -> Result<Json<Customer>> {
    let conn = state.db.get()?;

    let existing = queries::get_customer_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
    if existing.org_id != path.org_id {
        return Err(AppError::NotFound("Customer not found".into()));
    }

    queries::update_customer(&conn, &path.id, &input)?;

    let customer = queries::get_customer_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::Internal("Customer not found after update".into()))?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let existing = queries::get_customer_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
    if existing.org_id != path.org_id {
        return Err(AppError::NotFound("Customer not found".into()));
    }

    queries::delete_customer(&conn, &path.id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
