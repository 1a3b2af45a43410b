use chrono::Utc;
use rusqlite::{Connection, params, types::Value};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::keygen;
use crate::models::*;

use super::from_row::{
    ACTIVATION_COLS, API_KEY_COLS, CUSTOMER_COLS, INVENTORY_LINE_COLS, LICENSE_COLS,
    LICENSE_WITH_PRODUCT_COLS, ORGANIZATION_COLS, PRODUCT_COLS, RESELLER_COLS,
    SALE_TRANSACTION_COLS, USER_COLS, query_all, query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Hash an API key for storage/lookup. Keys are never stored in the clear.
pub fn hash_secret(secret: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"keymint-api-key-v1:");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate an API key with km_ prefix
pub fn generate_api_key() -> String {
    format!("km_{}", Uuid::new_v4().to_string().replace("-", ""))
}

/// How many times a license insert retries with a fresh key when it hits
/// the UNIQUE index on license_key.
const KEY_INSERT_ATTEMPTS: usize = 5;

fn is_unique_violation(err: &rusqlite::Error, needle: &str) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, Some(msg))
        if e.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains(needle))
}

/// Builder for dynamic UPDATE statements with optional fields.
/// Combines multiple field updates into a single query for efficiency.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
    track_updated_at: bool,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
            track_updated_at: false,
        }
    }

    fn with_updated_at(mut self) -> Self {
        self.track_updated_at = true;
        self
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set a column to an explicit value (including NULL).
    /// Use this for Option<Option<T>> update fields.
    fn set_nullable<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.fields.push((column, v.into())),
            None => self.fields.push((column, Value::Null)),
        }
        self
    }

    fn execute(mut self, conn: &Connection) -> Result<bool> {
        if self.fields.is_empty() {
            return Ok(false);
        }
        if self.track_updated_at {
            self.fields.push(("updated_at", now().into()));
        }
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "));
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(affected > 0)
    }
}

// ============ Users ============

pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO users (id, email, name, role, org_id, reseller_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &id,
            &input.email,
            &input.name,
            input.role.as_ref(),
            &input.org_id,
            &input.reseller_id,
            now,
            now
        ],
    )?;

    Ok(User {
        id,
        email: input.email.clone(),
        name: input.name.clone(),
        role: input.role,
        org_id: input.org_id.clone(),
        reseller_id: input.reseller_id.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email],
    )
}

pub fn update_user_name(conn: &Connection, id: &str, name: &str) -> Result<bool> {
    UpdateBuilder::new("users", id)
        .with_updated_at()
        .set("name", name.to_string())
        .execute(conn)
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .map_err(Into::into)
}

fn count_users_with_role(conn: &Connection, role: Role) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = ?1",
        params![role.as_ref()],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ API keys ============

/// Resolve an API key to its user. Updates last_used_at on a hit.
pub fn get_user_by_api_key(conn: &Connection, api_key: &str) -> Result<Option<User>> {
    let hash = hash_secret(api_key);

    let key: Option<ApiKey> = query_one(
        conn,
        &format!(
            "SELECT {} FROM api_keys WHERE key_hash = ?1 AND revoked_at IS NULL",
            API_KEY_COLS
        ),
        &[&hash],
    )?;

    if let Some(key) = key {
        // Update last_used_at (fire and forget)
        let _ = conn.execute(
            "UPDATE api_keys SET last_used_at = ?1 WHERE id = ?2",
            params![now(), &key.id],
        );

        return get_user_by_id(conn, &key.user_id);
    }

    Ok(None)
}

/// Create an API key for a user. Returns the record and the plaintext key;
/// the plaintext is only ever available here.
pub fn create_api_key(conn: &Connection, user_id: &str) -> Result<(ApiKey, String)> {
    let id = gen_id();
    let now = now();
    let key = generate_api_key();
    let prefix = &key[..8];
    let key_hash = hash_secret(&key);

    conn.execute(
        "INSERT INTO api_keys (id, user_id, key_prefix, key_hash, created_at, last_used_at, revoked_at)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL)",
        params![&id, user_id, prefix, &key_hash, now],
    )?;

    Ok((
        ApiKey {
            id,
            user_id: user_id.to_string(),
            key_prefix: prefix.to_string(),
            key_hash,
            created_at: now,
            last_used_at: None,
            revoked_at: None,
        },
        key,
    ))
}

/// Revoke every active key for the user and issue a fresh one.
pub fn rotate_api_key(conn: &Connection, user_id: &str) -> Result<(ApiKey, String)> {
    conn.execute(
        "UPDATE api_keys SET revoked_at = ?1 WHERE user_id = ?2 AND revoked_at IS NULL",
        params![now(), user_id],
    )?;
    create_api_key(conn, user_id)
}

/// Create the first admin user at startup if none exists yet.
/// Returns the plaintext API key when a bootstrap happened.
pub fn bootstrap_admin(conn: &Connection, email: &str) -> Result<Option<String>> {
    if count_users_with_role(conn, Role::Admin)? > 0 {
        return Ok(None);
    }

    let user = create_user(
        conn,
        &CreateUser {
            email: email.to_string(),
            name: "Platform Admin".to_string(),
            role: Role::Admin,
            org_id: None,
            reseller_id: None,
        },
    )?;
    let (_, key) = create_api_key(conn, &user.id)?;
    Ok(Some(key))
}

// ============ Organizations ============

pub fn create_organization(conn: &Connection, input: &CreateOrganization) -> Result<Organization> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO organizations (id, name, owner_email, plan, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &input.name,
            &input.owner_email,
            input.plan.as_ref(),
            OrgStatus::Active.as_ref(),
            now,
            now
        ],
    )?;

    Ok(Organization {
        id,
        name: input.name.clone(),
        owner_email: input.owner_email.clone(),
        plan: input.plan,
        status: OrgStatus::Active,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_organization_by_id(conn: &Connection, id: &str) -> Result<Option<Organization>> {
    query_one(
        conn,
        &format!("SELECT {} FROM organizations WHERE id = ?1", ORGANIZATION_COLS),
        &[&id],
    )
}

pub fn list_organizations(conn: &Connection) -> Result<Vec<Organization>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM organizations ORDER BY created_at DESC",
            ORGANIZATION_COLS
        ),
        [],
    )
}

pub fn list_organizations_paginated(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Organization>, i64)> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM organizations", [], |row| row.get(0))?;
    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM organizations ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
            ORGANIZATION_COLS
        ),
        params![limit, offset],
    )?;
    Ok((items, total))
}

pub fn update_organization(
    conn: &Connection,
    id: &str,
    input: &UpdateOrganization,
) -> Result<bool> {
    UpdateBuilder::new("organizations", id)
        .with_updated_at()
        .set_opt("name", input.name.clone())
        .set_opt("plan", input.plan.map(|p| p.as_ref().to_string()))
        .set_opt("status", input.status.map(|s| s.as_ref().to_string()))
        .execute(conn)
}

pub fn delete_organization(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM organizations WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn count_organizations(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM organizations", [], |row| row.get(0))
        .map_err(Into::into)
}

pub fn count_organizations_with_status(conn: &Connection, status: OrgStatus) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM organizations WHERE status = ?1",
        params![status.as_ref()],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ Products ============

pub fn create_product(conn: &Connection, org_id: &str, input: &CreateProduct) -> Result<Product> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO products (id, org_id, name, description, price_cents, key_prefix,
                               license_duration_days, max_activations, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            &id,
            org_id,
            &input.name,
            &input.description,
            input.price_cents,
            &input.key_prefix,
            input.license_duration_days,
            input.max_activations,
            ProductStatus::Active.as_ref(),
            now,
            now
        ],
    )?;

    Ok(Product {
        id,
        org_id: org_id.to_string(),
        name: input.name.clone(),
        description: input.description.clone(),
        price_cents: input.price_cents,
        key_prefix: input.key_prefix.clone(),
        license_duration_days: input.license_duration_days,
        max_activations: input.max_activations,
        status: ProductStatus::Active,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_product_by_id(conn: &Connection, id: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLS),
        &[&id],
    )
}

pub fn list_products_for_org(conn: &Connection, org_id: &str) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM products WHERE org_id = ?1 ORDER BY created_at DESC",
            PRODUCT_COLS
        ),
        &[&org_id],
    )
}

pub fn update_product(conn: &Connection, id: &str, input: &UpdateProduct) -> Result<bool> {
    let mut builder = UpdateBuilder::new("products", id)
        .with_updated_at()
        .set_opt("name", input.name.clone())
        .set_opt("price_cents", input.price_cents)
        .set_opt("key_prefix", input.key_prefix.clone())
        .set_opt("max_activations", input.max_activations)
        .set_opt("status", input.status.map(|s| s.as_ref().to_string()));
    if let Some(description) = input.description.clone() {
        builder = builder.set_nullable("description", description);
    }
    if let Some(days) = input.license_duration_days {
        builder = builder.set_nullable("license_duration_days", days);
    }
    builder.execute(conn)
}

pub fn delete_product(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Customers ============

pub fn create_customer(conn: &Connection, org_id: &str, input: &CreateCustomer) -> Result<Customer> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO customers (id, org_id, name, email, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&id, org_id, &input.name, &input.email, now],
    )?;

    Ok(Customer {
        id,
        org_id: org_id.to_string(),
        name: input.name.clone(),
        email: input.email.clone(),
        created_at: now,
    })
}

pub fn get_customer_by_id(conn: &Connection, id: &str) -> Result<Option<Customer>> {
    query_one(
        conn,
        &format!("SELECT {} FROM customers WHERE id = ?1", CUSTOMER_COLS),
        &[&id],
    )
}

pub fn list_customers_for_org(conn: &Connection, org_id: &str) -> Result<Vec<Customer>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM customers WHERE org_id = ?1 ORDER BY created_at DESC",
            CUSTOMER_COLS
        ),
        &[&org_id],
    )
}

pub fn update_customer(conn: &Connection, id: &str, input: &UpdateCustomer) -> Result<bool> {
    UpdateBuilder::new("customers", id)
        .set_opt("name", input.name.clone())
        .set_opt("email", input.email.clone())
        .execute(conn)
}

pub fn delete_customer(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM customers WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Licenses ============

fn insert_license_row(
    conn: &Connection,
    org_id: &str,
    product_id: &str,
    license_key: &str,
    input: &CreateLicense,
) -> Result<License> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO licenses (id, org_id, product_id, customer_id, license_key, status,
                               license_type, max_activations, current_activations, expires_at,
                               price_cents, duration_days, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12, ?13)",
        params![
            &id,
            org_id,
            product_id,
            &input.customer_id,
            license_key,
            input.status.as_ref(),
            input.license_type.as_ref(),
            input.max_activations,
            input.expires_at,
            input.price_cents,
            input.duration_days,
            now,
            now
        ],
    )?;

    Ok(License {
        id,
        org_id: org_id.to_string(),
        product_id: product_id.to_string(),
        customer_id: input.customer_id.clone(),
        license_key: license_key.to_string(),
        status: input.status,
        license_type: input.license_type,
        max_activations: input.max_activations,
        current_activations: 0,
        expires_at: input.expires_at,
        price_cents: input.price_cents,
        duration_days: input.duration_days,
        created_at: now,
        updated_at: now,
    })
}

/// Create a single license with a freshly generated key.
///
/// The UNIQUE index on license_key backstops the generator; on a collision
/// the insert retries with a new key a bounded number of times.
pub fn create_license(
    conn: &Connection,
    org_id: &str,
    product_id: &str,
    key_prefix: &str,
    input: &CreateLicense,
) -> Result<License> {
    for _ in 0..KEY_INSERT_ATTEMPTS {
        let key = keygen::generate_license_key(key_prefix, keygen::DEFAULT_PAYLOAD_LEN);
        match insert_license_row(conn, org_id, product_id, &key, input) {
            Ok(license) => return Ok(license),
            Err(AppError::Database(e)) if is_unique_violation(&e, "license_key") => continue,
            Err(e) => return Err(e),
        }
    }
    Err(AppError::Conflict(
        "Could not generate a unique license key".into(),
    ))
}

/// Create `count` licenses in one transaction. All-or-nothing: a failure on
/// any row rolls back the whole batch.
pub fn create_licenses_bulk(
    conn: &mut Connection,
    org_id: &str,
    product_id: &str,
    key_prefix: &str,
    count: i32,
    input: &CreateLicense,
) -> Result<Vec<License>> {
    if count < 1 {
        return Err(AppError::BadRequest("Count must be at least 1".into()));
    }

    let tx = conn.transaction()?;
    let mut created = Vec::with_capacity(count as usize);
    for _ in 0..count {
        created.push(create_license(&tx, org_id, product_id, key_prefix, input)?);
    }
    tx.commit()?;
    Ok(created)
}

pub fn get_license_by_id(conn: &Connection, id: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE id = ?1", LICENSE_COLS),
        &[&id],
    )
}

pub fn get_license_by_key(conn: &Connection, license_key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE license_key = ?1", LICENSE_COLS),
        &[&license_key],
    )
}

pub fn list_licenses_for_org(conn: &Connection, org_id: &str) -> Result<Vec<LicenseWithProduct>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM licenses l JOIN products p ON p.id = l.product_id
             WHERE l.org_id = ?1 ORDER BY l.created_at DESC",
            LICENSE_WITH_PRODUCT_COLS
        ),
        &[&org_id],
    )
}

pub fn list_licenses_for_product(conn: &Connection, product_id: &str) -> Result<Vec<License>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM licenses WHERE product_id = ?1 ORDER BY created_at DESC",
            LICENSE_COLS
        ),
        &[&product_id],
    )
}

pub fn update_license(conn: &Connection, id: &str, input: &UpdateLicense) -> Result<bool> {
    let mut builder = UpdateBuilder::new("licenses", id)
        .with_updated_at()
        .set_opt("status", input.status.map(|s| s.as_ref().to_string()));
    if let Some(customer_id) = input.customer_id.clone() {
        builder = builder.set_nullable("customer_id", customer_id);
    }
    if let Some(expires_at) = input.expires_at {
        builder = builder.set_nullable("expires_at", expires_at);
    }
    builder.execute(conn)
}

pub fn delete_license(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM licenses WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn count_licenses(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))
        .map_err(Into::into)
}

// ============ Resellers ============

pub fn create_reseller(conn: &Connection, org_id: &str, shop_name: &str) -> Result<Reseller> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO resellers (id, org_id, shop_name, balance_cents, created_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![&id, org_id, shop_name, now],
    )?;

    Ok(Reseller {
        id,
        org_id: org_id.to_string(),
        shop_name: shop_name.to_string(),
        balance_cents: 0,
        created_at: now,
    })
}

pub fn get_reseller_by_id(conn: &Connection, id: &str) -> Result<Option<Reseller>> {
    query_one(
        conn,
        &format!("SELECT {} FROM resellers WHERE id = ?1", RESELLER_COLS),
        &[&id],
    )
}

pub fn list_resellers_for_org(conn: &Connection, org_id: &str) -> Result<Vec<Reseller>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM resellers WHERE org_id = ?1 ORDER BY created_at DESC",
            RESELLER_COLS
        ),
        &[&org_id],
    )
}

pub fn delete_reseller(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM resellers WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Inventory ============

/// Create an inventory line with `quantity` keys generated into the pool.
pub fn create_inventory_line(
    conn: &Connection,
    reseller_id: &str,
    key_prefix: &str,
    input: &CreateInventoryLine,
) -> Result<InventoryLine> {
    if input.quantity < 0 {
        return Err(AppError::BadRequest("Quantity cannot be negative".into()));
    }

    let id = gen_id();
    let now = now();
    let keys: Vec<String> = (0..input.quantity)
        .map(|_| keygen::generate_license_key(key_prefix, keygen::DEFAULT_PAYLOAD_LEN))
        .collect();
    let pool_json = serde_json::to_string(&keys)?;

    conn.execute(
        "INSERT INTO inventory_lines (id, reseller_id, product_id, purchase_price_cents,
                                      resale_price_cents, quantity_available, quantity_sold,
                                      keys_pool, license_duration_days, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?10)",
        params![
            &id,
            reseller_id,
            &input.product_id,
            input.purchase_price_cents,
            input.resale_price_cents,
            input.quantity,
            &pool_json,
            input.license_duration_days,
            now,
            now
        ],
    )?;

    Ok(InventoryLine {
        id,
        reseller_id: reseller_id.to_string(),
        product_id: input.product_id.clone(),
        purchase_price_cents: input.purchase_price_cents,
        resale_price_cents: input.resale_price_cents,
        quantity_available: input.quantity,
        quantity_sold: 0,
        keys_pool: keys,
        license_duration_days: input.license_duration_days,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_inventory_line_by_id(conn: &Connection, id: &str) -> Result<Option<InventoryLine>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM inventory_lines WHERE id = ?1",
            INVENTORY_LINE_COLS
        ),
        &[&id],
    )
}

pub fn list_inventory_for_reseller(
    conn: &Connection,
    reseller_id: &str,
) -> Result<Vec<InventoryLine>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM inventory_lines WHERE reseller_id = ?1 ORDER BY created_at DESC",
            INVENTORY_LINE_COLS
        ),
        &[&reseller_id],
    )
}

pub fn update_inventory_line(
    conn: &Connection,
    id: &str,
    input: &UpdateInventoryLine,
) -> Result<bool> {
    let mut builder = UpdateBuilder::new("inventory_lines", id)
        .with_updated_at()
        .set_opt("resale_price_cents", input.resale_price_cents);
    if let Some(days) = input.license_duration_days {
        builder = builder.set_nullable("license_duration_days", days);
    }
    builder.execute(conn)
}

pub fn delete_inventory_line(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM inventory_lines WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Add `quantity` freshly generated keys to a line's pool and bump
/// quantity_available to match.
pub fn restock_inventory_line(
    conn: &mut Connection,
    id: &str,
    key_prefix: &str,
    quantity: i32,
) -> Result<InventoryLine> {
    if quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let tx = conn.transaction()?;
    let line = get_inventory_line_by_id(&tx, id)?
        .ok_or_else(|| AppError::NotFound("Inventory line not found".into()))?;

    let mut pool = line.keys_pool.clone();
    pool.extend(
        (0..quantity).map(|_| keygen::generate_license_key(key_prefix, keygen::DEFAULT_PAYLOAD_LEN)),
    );
    let pool_json = serde_json::to_string(&pool)?;

    tx.execute(
        "UPDATE inventory_lines
         SET quantity_available = quantity_available + ?1, keys_pool = ?2, updated_at = ?3
         WHERE id = ?4",
        params![quantity, &pool_json, now(), id],
    )?;
    tx.commit()?;

    get_inventory_line_by_id(conn, id)?
        .ok_or_else(|| AppError::Internal("Inventory line not found after restock".into()))
}

// ============ Sales ============

/// Record a sale of `quantity` keys against an inventory line.
///
/// Draws keys FIFO from the line's pool (generating any shortfall), inserts
/// the transaction row, and moves the available/sold counters — all in one
/// transaction, so the counters can never drift from the recorded sale.
pub fn record_sale(
    conn: &mut Connection,
    reseller_id: &str,
    key_prefix: &str,
    input: &RecordSale,
) -> Result<SaleTransaction> {
    if input.quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let tx = conn.transaction()?;

    let line = get_inventory_line_by_id(&tx, &input.inventory_line_id)?
        .ok_or_else(|| AppError::NotFound("Inventory line not found".into()))?;
    if line.reseller_id != reseller_id {
        return Err(AppError::NotFound("Inventory line not found".into()));
    }
    if line.quantity_available < input.quantity {
        return Err(AppError::BadRequest(format!(
            "Only {} unit(s) available",
            line.quantity_available
        )));
    }

    let mut pool = line.keys_pool.clone();
    let take = (input.quantity as usize).min(pool.len());
    let mut keys: Vec<String> = pool.drain(..take).collect();
    while keys.len() < input.quantity as usize {
        keys.push(keygen::generate_license_key(
            key_prefix,
            keygen::DEFAULT_PAYLOAD_LEN,
        ));
    }

    let id = gen_id();
    let now = now();
    let amount_cents = line.resale_price_cents * input.quantity as i64;
    let keys_json = serde_json::to_string(&keys)?;
    let pool_json = serde_json::to_string(&pool)?;

    tx.execute(
        "INSERT INTO sale_transactions (id, reseller_id, product_id, customer_name,
                                        customer_email, license_keys, quantity, amount_cents,
                                        transaction_type, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            &id,
            reseller_id,
            &line.product_id,
            &input.customer_name,
            &input.customer_email,
            &keys_json,
            input.quantity,
            amount_cents,
            TransactionType::Sale.as_ref(),
            TransactionStatus::Completed.as_ref(),
            now
        ],
    )?;

    tx.execute(
        "UPDATE inventory_lines
         SET quantity_available = quantity_available - ?1,
             quantity_sold = quantity_sold + ?2,
             keys_pool = ?3,
             updated_at = ?4
         WHERE id = ?5",
        params![input.quantity, input.quantity, &pool_json, now, &line.id],
    )?;

    tx.commit()?;

    Ok(SaleTransaction {
        id,
        reseller_id: reseller_id.to_string(),
        product_id: line.product_id,
        customer_name: input.customer_name.clone(),
        customer_email: input.customer_email.clone(),
        license_keys: keys,
        quantity: input.quantity,
        amount_cents,
        transaction_type: TransactionType::Sale,
        status: TransactionStatus::Completed,
        created_at: now,
    })
}

/// Delete a sale and undo its inventory bookkeeping: available is restored,
/// sold is decremented, and the sold keys return to the pool. Runs in one
/// transaction. If the inventory line no longer exists only the transaction
/// row is removed.
pub fn delete_sale(conn: &mut Connection, reseller_id: &str, sale_id: &str) -> Result<bool> {
    let tx = conn.transaction()?;

    let sale = match get_sale_by_id(&tx, sale_id)? {
        Some(s) => s,
        None => return Ok(false),
    };
    if sale.reseller_id != reseller_id {
        return Err(AppError::NotFound("Transaction not found".into()));
    }

    if sale.transaction_type == TransactionType::Sale {
        let line: Option<InventoryLine> = query_one(
            &tx,
            &format!(
                "SELECT {} FROM inventory_lines WHERE reseller_id = ?1 AND product_id = ?2",
                INVENTORY_LINE_COLS
            ),
            params![reseller_id, &sale.product_id],
        )?;

        if let Some(line) = line {
            let mut pool = line.keys_pool.clone();
            pool.extend(sale.license_keys.iter().cloned());
            let pool_json = serde_json::to_string(&pool)?;

            tx.execute(
                "UPDATE inventory_lines
                 SET quantity_available = quantity_available + ?1,
                     quantity_sold = MAX(quantity_sold - ?2, 0),
                     keys_pool = ?3,
                     updated_at = ?4
                 WHERE id = ?5",
                params![sale.quantity, sale.quantity, &pool_json, now(), &line.id],
            )?;
        }
    }

    tx.execute(
        "DELETE FROM sale_transactions WHERE id = ?1",
        params![sale_id],
    )?;
    tx.commit()?;
    Ok(true)
}

pub fn get_sale_by_id(conn: &Connection, id: &str) -> Result<Option<SaleTransaction>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM sale_transactions WHERE id = ?1",
            SALE_TRANSACTION_COLS
        ),
        &[&id],
    )
}

pub fn list_sales_for_reseller(
    conn: &Connection,
    reseller_id: &str,
) -> Result<Vec<SaleTransaction>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM sale_transactions WHERE reseller_id = ?1 ORDER BY created_at DESC",
            SALE_TRANSACTION_COLS
        ),
        &[&reseller_id],
    )
}

pub fn list_sales_for_customer_email(
    conn: &Connection,
    email: &str,
) -> Result<Vec<SaleTransaction>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM sale_transactions WHERE customer_email = ?1 ORDER BY created_at DESC",
            SALE_TRANSACTION_COLS
        ),
        &[&email],
    )
}

pub fn total_sales_revenue_cents(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM sale_transactions
         WHERE transaction_type = 'sale' AND status = 'completed'",
        [],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ Activations ============

/// Record an activation of a license key by an end-user program.
///
/// Enforces the license's activation limit and bumps current_activations in
/// the same transaction as the insert.
pub fn create_activation(
    conn: &mut Connection,
    org_id: &str,
    input: &CreateActivation,
) -> Result<Activation> {
    let tx = conn.transaction()?;

    let license = get_license_by_key(&tx, &input.license_key)?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;
    if license.org_id != org_id {
        return Err(AppError::NotFound("License not found".into()));
    }
    if license.current_activations >= license.max_activations {
        return Err(AppError::BadRequest("Activation limit reached".into()));
    }

    let id = gen_id();
    let now = now();

    tx.execute(
        "INSERT INTO activations (id, org_id, license_key, email, program_name, status,
                                  activated_at, last_seen_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)",
        params![
            &id,
            org_id,
            &input.license_key,
            &input.email,
            &input.program_name,
            ActivationStatus::Active.as_ref(),
            now
        ],
    )?;

    tx.execute(
        "UPDATE licenses SET current_activations = current_activations + 1, updated_at = ?1
         WHERE id = ?2",
        params![now, &license.id],
    )?;

    tx.commit()?;

    Ok(Activation {
        id,
        org_id: org_id.to_string(),
        license_key: input.license_key.clone(),
        email: input.email.clone(),
        program_name: input.program_name.clone(),
        status: ActivationStatus::Active,
        activated_at: now,
        last_seen_at: None,
    })
}

pub fn get_activation_by_id(conn: &Connection, id: &str) -> Result<Option<Activation>> {
    query_one(
        conn,
        &format!("SELECT {} FROM activations WHERE id = ?1", ACTIVATION_COLS),
        &[&id],
    )
}

pub fn list_activations_for_org(conn: &Connection, org_id: &str) -> Result<Vec<Activation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE org_id = ?1 ORDER BY activated_at DESC",
            ACTIVATION_COLS
        ),
        &[&org_id],
    )
}

pub fn list_activations_for_email(conn: &Connection, email: &str) -> Result<Vec<Activation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE email = ?1 ORDER BY activated_at DESC",
            ACTIVATION_COLS
        ),
        &[&email],
    )
}

/// Mark an activation inactive and release its slot on the license.
pub fn deactivate_activation(conn: &mut Connection, org_id: &str, id: &str) -> Result<Activation> {
    let tx = conn.transaction()?;

    let activation = get_activation_by_id(&tx, id)?
        .ok_or_else(|| AppError::NotFound("Activation not found".into()))?;
    if activation.org_id != org_id {
        return Err(AppError::NotFound("Activation not found".into()));
    }
    if activation.status == ActivationStatus::Inactive {
        return Err(AppError::BadRequest("Activation is already inactive".into()));
    }

    let now = now();
    tx.execute(
        "UPDATE activations SET status = ?1, last_seen_at = ?2 WHERE id = ?3",
        params![ActivationStatus::Inactive.as_ref(), now, id],
    )?;
    tx.execute(
        "UPDATE licenses
         SET current_activations = MAX(current_activations - 1, 0), updated_at = ?1
         WHERE license_key = ?2 AND org_id = ?3",
        params![now, &activation.license_key, org_id],
    )?;

    tx.commit()?;

    Ok(Activation {
        status: ActivationStatus::Inactive,
        last_seen_at: Some(now),
        ..activation
    })
}

// ============ Customer portal ============

/// Licenses assigned to a customer, looked up by the customer's email
/// across all organizations.
pub fn list_licenses_for_customer_email(
    conn: &Connection,
    email: &str,
) -> Result<Vec<LicenseWithProduct>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM licenses l
             JOIN products p ON p.id = l.product_id
             JOIN customers c ON c.id = l.customer_id
             WHERE c.email = ?1 ORDER BY l.created_at DESC",
            LICENSE_WITH_PRODUCT_COLS
        ),
        &[&email],
    )
}
