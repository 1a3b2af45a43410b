//! Row-to-struct mapping. Each model lists its column order once in a
//! `*_COLS` const; SELECTs interpolate the const so the `FromRow` impl and
//! the query can never drift apart.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, Params, Row};

use crate::error::Result;
use crate::models::*;

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

pub fn query_one<T: FromRow, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query_map(params, |row| T::from_row(row))?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

/// Parse a TEXT column into a strum enum, surfacing bad values as a
/// conversion failure instead of a panic.
fn parse_enum<T: FromStr>(idx: usize, value: String) -> rusqlite::Result<T> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognized value: {value}").into(),
        )
    })
}

/// Parse a JSON-array TEXT column into a Vec<String>.
fn parse_json_list(idx: usize, value: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

pub const USER_COLS: &str = "id, email, name, role, org_id, reseller_id, created_at, updated_at";

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: parse_enum(3, row.get::<_, String>(3)?)?,
            org_id: row.get(4)?,
            reseller_id: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

pub const API_KEY_COLS: &str =
    "id, user_id, key_prefix, key_hash, created_at, last_used_at, revoked_at";

impl FromRow for ApiKey {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ApiKey {
            id: row.get(0)?,
            user_id: row.get(1)?,
            key_prefix: row.get(2)?,
            key_hash: row.get(3)?,
            created_at: row.get(4)?,
            last_used_at: row.get(5)?,
            revoked_at: row.get(6)?,
        })
    }
}

pub const ORGANIZATION_COLS: &str =
    "id, name, owner_email, plan, status, created_at, updated_at";

impl FromRow for Organization {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Organization {
            id: row.get(0)?,
            name: row.get(1)?,
            owner_email: row.get(2)?,
            plan: parse_enum(3, row.get::<_, String>(3)?)?,
            status: parse_enum(4, row.get::<_, String>(4)?)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

pub const PRODUCT_COLS: &str = "id, org_id, name, description, price_cents, key_prefix, \
     license_duration_days, max_activations, status, created_at, updated_at";

impl FromRow for Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            org_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            price_cents: row.get(4)?,
            key_prefix: row.get(5)?,
            license_duration_days: row.get(6)?,
            max_activations: row.get(7)?,
            status: parse_enum(8, row.get::<_, String>(8)?)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

pub const CUSTOMER_COLS: &str = "id, org_id, name, email, created_at";

impl FromRow for Customer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Customer {
            id: row.get(0)?,
            org_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

pub const LICENSE_COLS: &str = "id, org_id, product_id, customer_id, license_key, status, \
     license_type, max_activations, current_activations, expires_at, price_cents, \
     duration_days, created_at, updated_at";

/// LICENSE_COLS qualified with `l.` plus the joined product name, for
/// licenses-with-product queries (`licenses l JOIN products p`).
pub const LICENSE_WITH_PRODUCT_COLS: &str =
    "l.id, l.org_id, l.product_id, l.customer_id, l.license_key, l.status, \
     l.license_type, l.max_activations, l.current_activations, l.expires_at, l.price_cents, \
     l.duration_days, l.created_at, l.updated_at, p.name";

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            org_id: row.get(1)?,
            product_id: row.get(2)?,
            customer_id: row.get(3)?,
            license_key: row.get(4)?,
            status: parse_enum(5, row.get::<_, String>(5)?)?,
            license_type: parse_enum(6, row.get::<_, String>(6)?)?,
            max_activations: row.get(7)?,
            current_activations: row.get(8)?,
            expires_at: row.get(9)?,
            price_cents: row.get(10)?,
            duration_days: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}

impl FromRow for LicenseWithProduct {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseWithProduct {
            license: License::from_row(row)?,
            product_name: row.get(14)?,
        })
    }
}

pub const RESELLER_COLS: &str = "id, org_id, shop_name, balance_cents, created_at";

impl FromRow for Reseller {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Reseller {
            id: row.get(0)?,
            org_id: row.get(1)?,
            shop_name: row.get(2)?,
            balance_cents: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

pub const INVENTORY_LINE_COLS: &str =
    "id, reseller_id, product_id, purchase_price_cents, resale_price_cents, \
     quantity_available, quantity_sold, keys_pool, license_duration_days, created_at, updated_at";

impl FromRow for InventoryLine {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(InventoryLine {
            id: row.get(0)?,
            reseller_id: row.get(1)?,
            product_id: row.get(2)?,
            purchase_price_cents: row.get(3)?,
            resale_price_cents: row.get(4)?,
            quantity_available: row.get(5)?,
            quantity_sold: row.get(6)?,
            keys_pool: parse_json_list(7, row.get::<_, String>(7)?)?,
            license_duration_days: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

pub const SALE_TRANSACTION_COLS: &str =
    "id, reseller_id, product_id, customer_name, customer_email, license_keys, \
     quantity, amount_cents, transaction_type, status, created_at";

impl FromRow for SaleTransaction {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(SaleTransaction {
            id: row.get(0)?,
            reseller_id: row.get(1)?,
            product_id: row.get(2)?,
            customer_name: row.get(3)?,
            customer_email: row.get(4)?,
            license_keys: parse_json_list(5, row.get::<_, String>(5)?)?,
            quantity: row.get(6)?,
            amount_cents: row.get(7)?,
            transaction_type: parse_enum(8, row.get::<_, String>(8)?)?,
            status: parse_enum(9, row.get::<_, String>(9)?)?,
            created_at: row.get(10)?,
        })
    }
}

pub const ACTIVATION_COLS: &str =
    "id, org_id, license_key, email, program_name, status, activated_at, last_seen_at";

impl FromRow for Activation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Activation {
            id: row.get(0)?,
            org_id: row.get(1)?,
            license_key: row.get(2)?,
            email: row.get(3)?,
            program_name: row.get(4)?,
            status: parse_enum(5, row.get::<_, String>(5)?)?,
            activated_at: row.get(6)?,
            last_seen_at: row.get(7)?,
        })
    }
}
