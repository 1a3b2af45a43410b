//! Customer portal: read-only views over the caller's own orders, keys and
//! activations, scoped by the session email.

use axum::{Extension, Router, extract::State, middleware, routing::get};

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::middleware::{SessionContext, customer_auth};
use crate::models::{Activation, LicenseWithProduct, SaleTransaction};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/customer/keys", get(my_keys))
        .route("/customer/orders", get(my_orders))
        .route("/customer/activations", get(my_activations))
        .layer(middleware::from_fn_with_state(state.clone(), customer_auth))
}

pub async fn my_keys(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<LicenseWithProduct>>> {
    let conn = state.db.get()?;
    let licenses = queries::list_licenses_for_customer_email(&conn, ctx.email())?;
    Ok(Json(licenses))
}

pub async fn my_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<SaleTransaction>>> {
    let conn = state.db.get()?;
    let orders = queries::list_sales_for_customer_email(&conn, ctx.email())?;
    Ok(Json(orders))
}

pub async fn my_activations(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<Activation>>> {
    let conn = state.db.get()?;
    let activations = queries::list_activations_for_email(&conn, ctx.email())?;
    Ok(Json(activations))
}
