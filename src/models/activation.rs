use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivationStatus {
    Active,
    Inactive,
}

/// A record of an end-user program using a license key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    pub org_id: String,
    pub license_key: String,
    pub email: String,
    pub program_name: String,
    pub status: ActivationStatus,
    pub activated_at: i64,
    pub last_seen_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateActivation {
    pub license_key: String,
    pub email: String,
    pub program_name: String,
}
