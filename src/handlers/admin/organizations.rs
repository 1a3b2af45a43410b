use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::handlers::{DEFAULT_PER_PAGE, ListQuery, Paginated};
use crate::listing;
use crate::models::{CreateOrganization, CreateUser, Organization, Role, UpdateOrganization};

#[derive(Serialize)]
pub struct OrganizationCreated {
    pub organization: Organization,
    /// Plaintext API key for the bootstrapped owner user; shown once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_api_key: Option<String>,
}

pub async fn create_organization(
    State(state): State<AppState>,
    Json(input): Json<CreateOrganization>,
) -> Result<Json<OrganizationCreated>> {
    if input.name.trim().is_empty() || input.owner_email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and owner email are required".into(),
        ));
    }

    let conn = state.db.get()?;
    let organization = queries::create_organization(&conn, &input)?;

    // First developer user for the org, so someone can actually sign in
    let owner = queries::create_user(
        &conn,
        &CreateUser {
            email: input.owner_email.clone(),
            name: input
                .owner_name
                .clone()
                .unwrap_or_else(|| input.owner_email.clone()),
            role: Role::Developer,
            org_id: Some(organization.id.clone()),
            reseller_id: None,
        },
    )?;
    let (_, owner_api_key) = queries::create_api_key(&conn, &owner.id)?;

    tracing::info!(
        "Created organization {} ({}) with owner {}",
        organization.name,
        organization.id,
        owner.email
    );

    Ok(Json(OrganizationCreated {
        organization,
        owner_api_key: Some(owner_api_key),
    }))
}

pub async fn list_organizations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Organization>>> {
    let conn = state.db.get()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    let (items, total) = queries::list_organizations_paginated(
        &conn,
        per_page as i64,
        ((page - 1) * per_page) as i64,
    )?;

    Ok(Json(Paginated {
        items,
        page_info: listing::paginate(total as usize, page, per_page),
    }))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Organization>> {
    let conn = state.db.get()?;
    let organization = queries::get_organization_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;
    Ok(Json(organization))
}

pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateOrganization>,
) -> Result<Json<Organization>> {
    let conn = state.db.get()?;

    queries::get_organization_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

    queries::update_organization(&conn, &id, &input)?;

    let organization = queries::get_organization_by_id(&conn, &id)?
        .ok_or_else(|| AppError::Internal("Organization not found after update".into()))?;

    tracing::info!("Updated organization {}", id);
    Ok(Json(organization))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let existing = queries::get_organization_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

    queries::delete_organization(&conn, &id)?;

    tracing::info!("Deleted organization {} ({})", existing.name, id);
    Ok(Json(serde_json::json!({ "deleted": true })))
}
