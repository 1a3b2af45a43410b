use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LicenseStatus {
    /// Generated but not yet assigned or sold
    Available,
    Active,
    Inactive,
    Expired,
    Revoked,
    Sold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LicenseType {
    Single,
    Floating,
    Concurrent,
    Standard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    pub org_id: String,
    pub product_id: String,
    /// Developer-managed customer link (optional)
    pub customer_id: Option<String>,
    pub license_key: String,
    pub status: LicenseStatus,
    pub license_type: LicenseType,
    pub max_activations: i32,
    pub current_activations: i32,
    pub expires_at: Option<i64>,
    pub price_cents: i64,
    pub duration_days: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseWithProduct {
    #[serde(flatten)]
    pub license: License,
    pub product_name: String,
}

/// Per-row input for license creation. The key itself is generated at the
/// insertion site, not supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLicense {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub status: LicenseStatus,
    pub license_type: LicenseType,
    pub max_activations: i32,
    pub expires_at: Option<i64>,
    pub price_cents: i64,
    pub duration_days: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLicense {
    pub status: Option<LicenseStatus>,
    pub customer_id: Option<Option<String>>,
    pub expires_at: Option<Option<i64>>,
}
