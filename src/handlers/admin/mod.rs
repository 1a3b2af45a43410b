mod organizations;
mod stats;

pub use organizations::*;
pub use stats::*;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::db::AppState;
use crate::middleware::admin_auth;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/organizations", post(create_organization))
        .route("/admin/organizations", get(list_organizations))
        .route("/admin/organizations/{id}", get(get_organization))
        .route("/admin/organizations/{id}", put(update_organization))
        .route("/admin/organizations/{id}", delete(delete_organization))
        .route("/admin/stats", get(platform_stats))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth))
}
