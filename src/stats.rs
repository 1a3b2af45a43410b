//! Pure aggregation over fetched rows.
//!
//! The stats endpoints recompute these from a fresh tenant-scoped query on
//! every call; nothing here is persisted or cached. Each function takes an
//! explicit `now` so tests pin the clock.

use serde::Serialize;

use crate::models::{
    Activation, ActivationStatus, License, LicenseStatus, SaleTransaction, TransactionStatus,
    TransactionType,
};

const SECONDS_PER_DAY: i64 = 86400;

/// Window for the "expiring soon" bucket.
pub const EXPIRING_SOON_DAYS: i64 = 30;
/// Window for the "urgent" bucket.
pub const EXPIRING_URGENT_DAYS: i64 = 7;

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct LicenseStats {
    pub total: usize,
    pub available: usize,
    pub active: usize,
    pub inactive: usize,
    pub expired: usize,
    pub revoked: usize,
    pub sold: usize,
    /// Active licenses expiring within 30 days
    pub expiring_soon: usize,
    /// Active licenses expiring within 7 days
    pub expiring_urgent: usize,
    pub active_percent: f64,
}

/// Summarize a license list against a fixed `now` (Unix seconds).
///
/// "Expiring soon" means status active and 0 < expires_at - now <= 30 days;
/// the urgent bucket uses the same rule at 7 days. Licenses whose status
/// field already says `expired` are counted as expired regardless of the
/// timestamp, matching how the rows are displayed.
pub fn summarize_licenses(licenses: &[License], now: i64) -> LicenseStats {
    let mut stats = LicenseStats {
        total: licenses.len(),
        ..Default::default()
    };

    for license in licenses {
        match license.status {
            LicenseStatus::Available => stats.available += 1,
            LicenseStatus::Active => stats.active += 1,
            LicenseStatus::Inactive => stats.inactive += 1,
            LicenseStatus::Expired => stats.expired += 1,
            LicenseStatus::Revoked => stats.revoked += 1,
            LicenseStatus::Sold => stats.sold += 1,
        }

        if license.status == LicenseStatus::Active
            && let Some(expires_at) = license.expires_at
        {
            let remaining = expires_at - now;
            if remaining > 0 && remaining <= EXPIRING_SOON_DAYS * SECONDS_PER_DAY {
                stats.expiring_soon += 1;
            }
            if remaining > 0 && remaining <= EXPIRING_URGENT_DAYS * SECONDS_PER_DAY {
                stats.expiring_urgent += 1;
            }
        }
    }

    stats.active_percent = percent(stats.active, stats.total);
    stats
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct SalesStats {
    pub transaction_count: usize,
    /// Revenue over completed sales
    pub revenue_cents: i64,
    /// Total refunded over completed refunds
    pub refunded_cents: i64,
    pub units_sold: i64,
    pub pending_count: usize,
}

pub fn summarize_sales(transactions: &[SaleTransaction]) -> SalesStats {
    let mut stats = SalesStats {
        transaction_count: transactions.len(),
        ..Default::default()
    };

    for tx in transactions {
        if tx.status == TransactionStatus::Pending {
            stats.pending_count += 1;
            continue;
        }
        match tx.transaction_type {
            TransactionType::Sale => {
                stats.revenue_cents += tx.amount_cents;
                stats.units_sold += tx.quantity as i64;
            }
            TransactionType::Refund => stats.refunded_cents += tx.amount_cents,
        }
    }

    stats
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ActivationStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

pub fn summarize_activations(activations: &[Activation]) -> ActivationStats {
    let mut stats = ActivationStats {
        total: activations.len(),
        ..Default::default()
    };
    for activation in activations {
        match activation.status {
            ActivationStatus::Active => stats.active += 1,
            ActivationStatus::Inactive => stats.inactive += 1,
        }
    }
    stats
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}
