//! Profile endpoints for any authenticated user.

use axum::{
    Extension, Router,
    extract::State,
    middleware,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::middleware::{SessionContext, user_auth};
use crate::models::{UpdateProfile, User};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile))
        .route("/me", put(update_profile))
        .route("/me/rotate-key", post(rotate_key))
        .layer(middleware::from_fn_with_state(state.clone(), user_auth))
}

pub async fn get_profile(Extension(ctx): Extension<SessionContext>) -> Result<Json<User>> {
    Ok(Json(ctx.user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(input): Json<UpdateProfile>,
) -> Result<Json<User>> {
    let conn = state.db.get()?;

    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".into()));
        }
        queries::update_user_name(&conn, &ctx.user.id, name)?;
    }

    let user = queries::get_user_by_id(&conn, &ctx.user.id)?
        .ok_or_else(|| AppError::Internal("User not found after update".into()))?;
    Ok(Json(user))
}

#[derive(Serialize)]
pub struct RotatedKey {
    /// The new plaintext API key; shown once. The old key stops working
    /// immediately.
    pub api_key: String,
}

pub async fn rotate_key(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<RotatedKey>> {
    let conn = state.db.get()?;
    let (_, api_key) = queries::rotate_api_key(&conn, &ctx.user.id)?;

    tracing::info!("Rotated API key for user {}", ctx.user.id);
    Ok(Json(RotatedKey { api_key }))
}
