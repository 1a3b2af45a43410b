use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::stats::{ActivationStats, LicenseStats, summarize_activations, summarize_licenses};

use super::OrgPath;

#[derive(Serialize)]
pub struct OrgStats {
    pub licenses: LicenseStats,
    pub activations: ActivationStats,
    pub products: usize,
    pub customers: usize,
}

/// GET /orgs/{org_id}/stats
///
/// Recomputed from a fresh tenant-scoped fetch on every call; nothing is
/// cached or persisted.
pub async fn org_stats(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
) -> Result<Json<OrgStats>> {
    let conn = state.db.get()?;

    let licenses: Vec<_> = queries::list_licenses_for_org(&conn, &path.org_id)?
        .into_iter()
        .map(|item| item.license)
        .collect();
    let activations = queries::list_activations_for_org(&conn, &path.org_id)?;
    let products = queries::list_products_for_org(&conn, &path.org_id)?;
    let customers = queries::list_customers_for_org(&conn, &path.org_id)?;

    let now = Utc::now().timestamp();

    Ok(Json(OrgStats {
        licenses: summarize_licenses(&licenses, now),
        activations: summarize_activations(&activations),
        products: products.len(),
        customers: customers.len(),
    }))
}
