//! Bearer API-key authentication.
//!
//! Every protected route group resolves the key to a `SessionContext` once,
//! here, and injects it as a request extension. Handlers read the session
//! from the extension instead of re-deriving the caller ad hoc.

use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::db::{AppState, queries};
use crate::models::{OrgStatus, Role, User};
use crate::util::extract_bearer_token;

/// The authenticated caller: user row plus the role/tenant scope derived
/// from it. One per request, shared by all handlers on the route.
#[derive(Clone)]
pub struct SessionContext {
    pub user: User,
}

impl SessionContext {
    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

fn authenticate(state: &AppState, request: &Request) -> Result<SessionContext, StatusCode> {
    let api_key =
        extract_bearer_token(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let conn = state.db.get().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let user = queries::get_user_by_api_key(&conn, api_key)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(SessionContext { user })
}

/// Platform admin routes (/admin/...).
pub async fn admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let ctx = authenticate(&state, &request)?;

    match ctx.role() {
        Role::Admin => {}
        Role::Developer | Role::Reseller | Role::Customer => {
            return Err(StatusCode::FORBIDDEN);
        }
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Org-scoped routes (/orgs/{org_id}/...). Developers must belong to the
/// organization in the path; admins pass for support access. The org must
/// exist and not be suspended.
pub async fn org_auth(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let org_id = params.get("org_id").ok_or(StatusCode::BAD_REQUEST)?;

    let ctx = authenticate(&state, &request)?;

    match ctx.role() {
        Role::Admin => {}
        Role::Developer if ctx.user.org_id.as_deref() == Some(org_id.as_str()) => {}
        Role::Developer | Role::Reseller | Role::Customer => {
            return Err(StatusCode::FORBIDDEN);
        }
    }

    let conn = state.db.get().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let org = queries::get_organization_by_id(&conn, org_id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    if org.status == OrgStatus::Suspended {
        return Err(StatusCode::FORBIDDEN);
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Reseller-scoped routes (/resellers/{reseller_id}/...).
pub async fn reseller_auth(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let reseller_id = params.get("reseller_id").ok_or(StatusCode::BAD_REQUEST)?;

    let ctx = authenticate(&state, &request)?;

    match ctx.role() {
        Role::Admin => {}
        Role::Reseller if ctx.user.reseller_id.as_deref() == Some(reseller_id.as_str()) => {}
        Role::Developer | Role::Reseller | Role::Customer => {
            return Err(StatusCode::FORBIDDEN);
        }
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Customer portal routes (/customer/...). Scope is the session email.
pub async fn customer_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let ctx = authenticate(&state, &request)?;

    match ctx.role() {
        Role::Customer => {}
        Role::Admin | Role::Developer | Role::Reseller => {
            return Err(StatusCode::FORBIDDEN);
        }
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Any authenticated user (/me routes).
pub async fn user_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let ctx = authenticate(&state, &request)?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
