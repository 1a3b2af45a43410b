use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::handlers::{ListQuery, Paginated, filtered_page};
use crate::models::{Activation, CreateActivation};

use super::{OrgItemPath, OrgPath};

pub async fn create_activation(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Json(input): Json<CreateActivation>,
) -> Result<Json<Activation>> {
    if input.license_key.trim().is_empty()
        || input.email.trim().is_empty()
        || input.program_name.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "License key, email and program name are required".into(),
        ));
    }

    let mut conn = state.db.get()?;
    let activation = queries::create_activation(&mut conn, &path.org_id, &input)?;

    tracing::info!(
        "Recorded activation of {} by {} (org: {})",
        activation.license_key,
        activation.email,
        path.org_id
    );
    Ok(Json(activation))
}

pub async fn list_activations(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Activation>>> {
    let conn = state.db.get()?;
    let activations = queries::list_activations_for_org(&conn, &path.org_id)?;
    Ok(Json(filtered_page(&activations, &query, |a| {
        vec![
            a.license_key.as_str(),
            a.email.as_str(),
            a.program_name.as_str(),
            a.status.as_ref(),
        ]
    })))
}

/// POST /orgs/{org_id}/activations/{id}/deactivate
pub async fn deactivate_activation(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
) -> Result<Json<Activation>> {
    let mut conn = state.db.get()?;
    let activation = queries::deactivate_activation(&mut conn, &path.org_id, &path.id)?;

    tracing::info!("Deactivated activation {} (org: {})", path.id, path.org_id);
    Ok(Json(activation))
}
