use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateReseller, CreateUser, Reseller, Role};

use super::{OrgItemPath, OrgPath};

#[derive(Serialize)]
pub struct ResellerCreated {
    pub reseller: Reseller,
    /// Plaintext API key for the reseller's login user; shown once.
    pub api_key: String,
}

/// POST /orgs/{org_id}/resellers
/// Register a reseller shop plus its login user in one step.
pub async fn create_reseller(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Json(input): Json<CreateReseller>,
) -> Result<Json<ResellerCreated>> {
    if input.shop_name.trim().is_empty() || input.email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Shop name and email are required".into(),
        ));
    }

    let conn = state.db.get()?;
    let reseller = queries::create_reseller(&conn, &path.org_id, &input.shop_name)?;

    let user = queries::create_user(
        &conn,
        &CreateUser {
            email: input.email.clone(),
            name: input.name.clone().unwrap_or_else(|| input.shop_name.clone()),
            role: Role::Reseller,
            org_id: None,
            reseller_id: Some(reseller.id.clone()),
        },
    )?;
    let (_, api_key) = queries::create_api_key(&conn, &user.id)?;

    tracing::info!(
        "Created reseller {} ({}) for org {}",
        reseller.shop_name,
        reseller.id,
        path.org_id
    );

    Ok(Json(ResellerCreated { reseller, api_key }))
}

pub async fn list_resellers(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
) -> Result<Json<Vec<Reseller>>> {
    let conn = state.db.get()?;
    let resellers = queries::list_resellers_for_org(&conn, &path.org_id)?;
    Ok(Json(resellers))
}

pub async fn delete_reseller(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let existing = queries::get_reseller_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("Reseller not found".into()))?;
    if existing.org_id != path.org_id {
        return Err(AppError::NotFound("Reseller not found".into()));
    }

    queries::delete_reseller(&conn, &path.id)?;

    tracing::info!("Deleted reseller {} (org: {})", path.id, path.org_id);
    Ok(Json(serde_json::json!({ "deleted": true })))
}
