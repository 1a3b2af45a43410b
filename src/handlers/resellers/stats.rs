use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::stats::{SalesStats, summarize_sales};

use super::ResellerPath;

#[derive(Serialize)]
pub struct ResellerStats {
    pub sales: SalesStats,
    pub inventory_lines: usize,
    pub units_available: i64,
    pub units_sold: i64,
}

/// GET /resellers/{reseller_id}/stats
pub async fn reseller_stats(
    State(state): State<AppState>,
    Path(path): Path<ResellerPath>,
) -> Result<Json<ResellerStats>> {
    let conn = state.db.get()?;

    let sales = queries::list_sales_for_reseller(&conn, &path.reseller_id)?;
    let lines = queries::list_inventory_for_reseller(&conn, &path.reseller_id)?;

    Ok(Json(ResellerStats {
        sales: summarize_sales(&sales),
        inventory_lines: lines.len(),
        units_available: lines.iter().map(|l| l.quantity_available as i64).sum(),
        units_sold: lines.iter().map(|l| l.quantity_sold as i64).sum(),
    }))
}
