mod inventory;
mod sales;
mod stats;

pub use inventory::*;
pub use sales::*;
pub use stats::*;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::db::AppState;
use crate::middleware::reseller_auth;

#[derive(Clone, serde::Deserialize)]
pub struct ResellerPath {
    pub reseller_id: String,
}

#[derive(Clone, serde::Deserialize)]
pub struct ResellerItemPath {
    pub reseller_id: String,
    pub id: String,
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // Inventory lines
        .route("/resellers/{reseller_id}/inventory", post(create_inventory))
        .route("/resellers/{reseller_id}/inventory", get(list_inventory))
        .route(
            "/resellers/{reseller_id}/inventory/{id}",
            put(update_inventory),
        )
        .route(
            "/resellers/{reseller_id}/inventory/{id}",
            delete(delete_inventory),
        )
        .route(
            "/resellers/{reseller_id}/inventory/{id}/restock",
            post(restock_inventory),
        )
        // Sales
        .route("/resellers/{reseller_id}/sales", post(record_sale))
        .route("/resellers/{reseller_id}/sales", get(list_sales))
        .route(
            "/resellers/{reseller_id}/sales/export.csv",
            get(export_sales_csv),
        )
        .route("/resellers/{reseller_id}/sales/{id}", get(get_sale))
        .route("/resellers/{reseller_id}/sales/{id}", delete(delete_sale))
        // Dashboard stats
        .route("/resellers/{reseller_id}/stats", get(reseller_stats))
        .layer(middleware::from_fn_with_state(state.clone(), reseller_auth))
}
