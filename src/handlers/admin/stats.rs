use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::OrgStatus;

#[derive(Serialize)]
pub struct PlatformStats {
    pub organizations: i64,
    pub active_organizations: i64,
    pub suspended_organizations: i64,
    pub users: i64,
    pub licenses: i64,
    pub revenue_cents: i64,
}

/// Platform-wide counters for the admin dashboard cards.
pub async fn platform_stats(State(state): State<AppState>) -> Result<Json<PlatformStats>> {
    let conn = state.db.get()?;

    Ok(Json(PlatformStats {
        organizations: queries::count_organizations(&conn)?,
        active_organizations: queries::count_organizations_with_status(&conn, OrgStatus::Active)?,
        suspended_organizations: queries::count_organizations_with_status(
            &conn,
            OrgStatus::Suspended,
        )?,
        users: queries::count_users(&conn)?,
        licenses: queries::count_licenses(&conn)?,
        revenue_cents: queries::total_sales_revenue_cents(&conn)?,
    }))
}
