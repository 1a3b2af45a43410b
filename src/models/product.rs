use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// Prefix for generated license keys, e.g. "KM" -> KM-XXXX-XXXX-...
    pub key_prefix: String,
    /// None = perpetual licenses
    pub license_duration_days: Option<i32>,
    pub max_activations: i32,
    pub status: ProductStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default)]
    pub license_duration_days: Option<i32>,
    #[serde(default = "default_max_activations")]
    pub max_activations: i32,
}

fn default_key_prefix() -> String {
    "KM".to_string()
}

fn default_max_activations() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub key_prefix: Option<String>,
    pub license_duration_days: Option<Option<i32>>,
    pub max_activations: Option<i32>,
    pub status: Option<ProductStatus>,
}
