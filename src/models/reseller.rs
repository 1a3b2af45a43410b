use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reseller {
    pub id: String,
    pub org_id: String,
    pub shop_name: String,
    pub balance_cents: i64,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateReseller {
    pub shop_name: String,
    /// Email for the reseller's login user
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A reseller's stock of one product: purchased/available/sold counters plus
/// the FIFO pool of unsold key strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLine {
    pub id: String,
    pub reseller_id: String,
    pub product_id: String,
    pub purchase_price_cents: i64,
    pub resale_price_cents: i64,
    pub quantity_available: i32,
    pub quantity_sold: i32,
    pub keys_pool: Vec<String>,
    pub license_duration_days: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateInventoryLine {
    pub product_id: String,
    pub purchase_price_cents: i64,
    pub resale_price_cents: i64,
    /// Initial stock; keys are generated into the pool up front
    pub quantity: i32,
    #[serde(default)]
    pub license_duration_days: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInventoryLine {
    pub resale_price_cents: Option<i64>,
    pub license_duration_days: Option<Option<i32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionType {
    Sale,
    Refund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTransaction {
    pub id: String,
    pub reseller_id: String,
    pub product_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub license_keys: Vec<String>,
    pub quantity: i32,
    pub amount_cents: i64,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecordSale {
    pub inventory_line_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub quantity: i32,
}
