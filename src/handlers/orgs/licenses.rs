use axum::extract::State;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::handlers::{ListQuery, Paginated, attachment, filtered_page};
use crate::listing;
use crate::models::{
    CreateLicense, License, LicenseStatus, LicenseType, LicenseWithProduct, UpdateLicense,
};
use crate::util::expires_from_days;

use super::{OrgItemPath, OrgPath};

/// Most licenses a single bulk-issuance request may create.
const MAX_BULK_COUNT: i32 = 100;

/// Request body for creating licenses (single or bulk).
#[derive(Debug, Deserialize)]
pub struct CreateLicenseBody {
    pub product_id: String,
    /// Link the licenses to a customer record (optional)
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default = "default_status")]
    pub status: LicenseStatus,
    #[serde(default = "default_type")]
    pub license_type: LicenseType,
    /// Override license duration in days from now.
    /// If not specified, uses the product's license_duration_days.
    #[serde(default)]
    pub duration_days: Option<Option<i32>>,
    /// Override the recorded unit price; defaults to the product price.
    #[serde(default)]
    pub price_cents: Option<i64>,
    /// Number of licenses to create (default: 1, max: 100)
    #[serde(default = "default_count")]
    pub count: i32,
}

fn default_status() -> LicenseStatus {
    LicenseStatus::Available
}

fn default_type() -> LicenseType {
    LicenseType::Standard
}

fn default_count() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub struct CreateLicenseResponse {
    pub licenses: Vec<CreatedLicense>,
}

#[derive(Debug, Serialize)]
pub struct CreatedLicense {
    pub id: String,
    pub license_key: String,
    pub expires_at: Option<i64>,
}

/// POST /orgs/{org_id}/licenses
/// Create one or more licenses in a single all-or-nothing batch.
pub async fn create_licenses(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Json(body): Json<CreateLicenseBody>,
) -> Result<Json<CreateLicenseResponse>> {
    // Validate count before touching the store
    if body.count < 1 || body.count > MAX_BULK_COUNT {
        return Err(AppError::BadRequest(format!(
            "Count must be between 1 and {}",
            MAX_BULK_COUNT
        )));
    }

    let mut conn = state.db.get()?;

    // Verify product exists and belongs to this org
    let product = queries::get_product_by_id(&conn, &body.product_id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    if product.org_id != path.org_id {
        return Err(AppError::NotFound(
            "Product not found in this organization".into(),
        ));
    }

    if let Some(customer_id) = &body.customer_id {
        let customer = queries::get_customer_by_id(&conn, customer_id)?
            .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
        if customer.org_id != path.org_id {
            return Err(AppError::NotFound(
                "Customer not found in this organization".into(),
            ));
        }
    }

    // Use the override if provided, otherwise the product defaults
    let now = chrono::Utc::now().timestamp();
    let duration_days = body
        .duration_days
        .unwrap_or(product.license_duration_days);
    let expires_at = expires_from_days(duration_days, now);
    let price_cents = body.price_cents.unwrap_or(product.price_cents);

    let input = CreateLicense {
        customer_id: body.customer_id.clone(),
        status: body.status,
        license_type: body.license_type,
        max_activations: product.max_activations,
        expires_at,
        price_cents,
        duration_days,
    };

    let created = queries::create_licenses_bulk(
        &mut conn,
        &path.org_id,
        &product.id,
        &product.key_prefix,
        body.count,
        &input,
    )?;

    tracing::info!(
        "Created {} license(s) for product {} (org: {})",
        created.len(),
        product.id,
        path.org_id
    );

    Ok(Json(CreateLicenseResponse {
        licenses: created
            .into_iter()
            .map(|license| CreatedLicense {
                id: license.id,
                license_key: license.license_key,
                expires_at: license.expires_at,
            })
            .collect(),
    }))
}

pub async fn list_licenses(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<LicenseWithProduct>>> {
    let conn = state.db.get()?;
    let licenses = queries::list_licenses_for_org(&conn, &path.org_id)?;
    Ok(Json(filtered_page(&licenses, &query, license_search_fields)))
}

fn license_search_fields(item: &LicenseWithProduct) -> Vec<&str> {
    let mut fields = vec![
        item.license.license_key.as_str(),
        item.product_name.as_str(),
        item.license.status.as_ref(),
        item.license.license_type.as_ref(),
    ];
    if let Some(customer_id) = &item.license.customer_id {
        fields.push(customer_id.as_str());
    }
    fields
}

pub async fn get_license(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
) -> Result<Json<License>> {
    let conn = state.db.get()?;
    let license = queries::get_license_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;

    if license.org_id != path.org_id {
        return Err(AppError::NotFound("License not found".into()));
    }

    Ok(Json(license))
}

pub async fn update_license(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
    Json(input): Json<UpdateLicense>,
) -> Result<Json<License>> {
    let conn = state.db.get()?;

    let existing = queries::get_license_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;
    if existing.org_id != path.org_id {
        return Err(AppError::NotFound("License not found".into()));
    }

    queries::update_license(&conn, &path.id, &input)?;

    let license = queries::get_license_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::Internal("License not found after update".into()))?;
    Ok(Json(license))
}

pub async fn delete_license(
    State(state): State<AppState>,
    Path(path): Path<OrgItemPath>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let existing = queries::get_license_by_id(&conn, &path.id)?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;
    if existing.org_id != path.org_id {
        return Err(AppError::NotFound("License not found".into()));
    }

    queries::delete_license(&conn, &path.id)?;

    tracing::info!("Deleted license {} (org: {})", path.id, path.org_id);
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /orgs/{org_id}/licenses/export.csv
pub async fn export_licenses_csv(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
) -> Result<Response> {
    let conn = state.db.get()?;
    let licenses = queries::list_licenses_for_org(&conn, &path.org_id)?;

    let rows: Vec<Vec<String>> = licenses
        .iter()
        .map(|item| {
            vec![
                item.license.license_key.clone(),
                item.product_name.clone(),
                item.license.status.as_ref().to_string(),
                item.license.license_type.as_ref().to_string(),
                item.license.customer_id.clone().unwrap_or_default(),
                item.license.max_activations.to_string(),
                item.license.current_activations.to_string(),
                item.license
                    .expires_at
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                item.license.price_cents.to_string(),
                item.license.created_at.to_string(),
            ]
        })
        .collect();

    let csv = listing::to_csv(
        &[
            "license_key",
            "product",
            "status",
            "type",
            "customer_id",
            "max_activations",
            "current_activations",
            "expires_at",
            "price_cents",
            "created_at",
        ],
        &rows,
    );

    Ok(attachment("text/csv; charset=utf-8", "licenses.csv", csv))
}

/// GET /orgs/{org_id}/licenses/export.txt — newline-joined key list
pub async fn export_licenses_txt(
    State(state): State<AppState>,
    Path(path): Path<OrgPath>,
) -> Result<Response> {
    let conn = state.db.get()?;
    let licenses = queries::list_licenses_for_org(&conn, &path.org_id)?;

    let keys: Vec<String> = licenses
        .into_iter()
        .map(|item| item.license.license_key)
        .collect();

    Ok(attachment(
        "text/plain; charset=utf-8",
        "license-keys.txt",
        listing::to_key_list(&keys),
    ))
}
