mod activations;
mod customers;
mod licenses;
mod products;
mod resellers;
mod stats;

pub use activations::*;
pub use customers::*;
pub use licenses::*;
pub use products::*;
pub use resellers::*;
pub use stats::*;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::db::AppState;
use crate::middleware::org_auth;

/// Path struct for handlers that only need the org scope.
/// The middleware uses HashMap extraction to support routes with extra params.
#[derive(Clone, serde::Deserialize)]
pub struct OrgPath {
    pub org_id: String,
}

#[derive(Clone, serde::Deserialize)]
pub struct OrgItemPath {
    pub org_id: String,
    pub id: String,
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // Products
        .route("/orgs/{org_id}/products", post(create_product))
        .route("/orgs/{org_id}/products", get(list_products))
        .route("/orgs/{org_id}/products/{id}", get(get_product))
        .route("/orgs/{org_id}/products/{id}", put(update_product))
        .route("/orgs/{org_id}/products/{id}", delete(delete_product))
        // Customers
        .route("/orgs/{org_id}/customers", post(create_customer))
        .route("/orgs/{org_id}/customers", get(list_customers))
        .route("/orgs/{org_id}/customers/{id}", put(update_customer))
        .route("/orgs/{org_id}/customers/{id}", delete(delete_customer))
        // Licenses (single + bulk issuance)
        .route("/orgs/{org_id}/licenses", post(create_licenses))
        .route("/orgs/{org_id}/licenses", get(list_licenses))
        .route("/orgs/{org_id}/licenses/export.csv", get(export_licenses_csv))
        .route("/orgs/{org_id}/licenses/export.txt", get(export_licenses_txt))
        .route("/orgs/{org_id}/licenses/{id}", get(get_license))
        .route("/orgs/{org_id}/licenses/{id}", put(update_license))
        .route("/orgs/{org_id}/licenses/{id}", delete(delete_license))
        // Resellers
        .route("/orgs/{org_id}/resellers", post(create_reseller))
        .route("/orgs/{org_id}/resellers", get(list_resellers))
        .route("/orgs/{org_id}/resellers/{id}", delete(delete_reseller))
        // Activations
        .route("/orgs/{org_id}/activations", post(create_activation))
        .route("/orgs/{org_id}/activations", get(list_activations))
        .route(
            "/orgs/{org_id}/activations/{id}/deactivate",
            post(deactivate_activation),
        )
        // Dashboard stats
        .route("/orgs/{org_id}/stats", get(org_stats))
        .layer(middleware::from_fn_with_state(state.clone(), org_auth))
}
