//! Shared fixtures for the database test suites.

use rusqlite::Connection;

use keymint::db::{queries, schema};
use keymint::models::*;

pub fn test_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    schema::init_db(&conn).unwrap();
    conn
}

pub fn seed_org(conn: &Connection) -> Organization {
    queries::create_organization(
        conn,
        &CreateOrganization {
            name: "Acme Software".into(),
            owner_email: "owner@acme.test".into(),
            owner_name: None,
            plan: OrgPlan::Pro,
        },
    )
    .unwrap()
}

pub fn seed_product(conn: &Connection, org_id: &str) -> Product {
    queries::create_product(
        conn,
        org_id,
        &CreateProduct {
            name: "Acme Editor".into(),
            description: Some("Desktop editor".into()),
            price_cents: 4900,
            key_prefix: "ACME".into(),
            license_duration_days: Some(365),
            max_activations: 3,
        },
    )
    .unwrap()
}

pub fn license_input() -> CreateLicense {
    CreateLicense {
        customer_id: None,
        status: LicenseStatus::Available,
        license_type: LicenseType::Standard,
        max_activations: 3,
        expires_at: None,
        price_cents: 4900,
        duration_days: None,
    }
}

pub fn seed_reseller_with_line(
    conn: &Connection,
    org_id: &str,
    product_id: &str,
    quantity: i32,
) -> (Reseller, InventoryLine) {
    let reseller = queries::create_reseller(conn, org_id, "Key Emporium").unwrap();
    let line = queries::create_inventory_line(
        conn,
        &reseller.id,
        "ACME",
        &CreateInventoryLine {
            product_id: product_id.to_string(),
            purchase_price_cents: 2500,
            resale_price_cents: 3900,
            quantity,
            license_duration_days: Some(365),
        },
    )
    .unwrap();
    (reseller, line)
}
