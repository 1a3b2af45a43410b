use axum::extract::State;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;

pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    // A pool checkout doubles as a storage liveness probe
    let _conn = state.db.get()?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
