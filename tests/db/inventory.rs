use keymint::db::queries;
use keymint::models::*;

use super::helpers::{seed_org, seed_product, seed_reseller_with_line, test_conn};

fn sale_input(line_id: &str, quantity: i32) -> RecordSale {
    RecordSale {
        inventory_line_id: line_id.to_string(),
        customer_name: "Jo Buyer".into(),
        customer_email: "jo@example.com".into(),
        quantity,
    }
}

#[test]
fn new_line_has_full_pool() {
    let conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (_, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 10);

    assert_eq!(line.quantity_available, 10);
    assert_eq!(line.quantity_sold, 0);
    assert_eq!(line.keys_pool.len(), 10);
    assert!(line.keys_pool.iter().all(|k| k.starts_with("ACME-")));
}

#[test]
fn recording_a_sale_moves_counters_and_drains_pool() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (reseller, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 10);
    let expected_keys: Vec<String> = line.keys_pool[..3].to_vec();

    let sale =
        queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, 3)).unwrap();

    // amount = quantity x resale price
    assert_eq!(sale.quantity, 3);
    assert_eq!(sale.amount_cents, 3 * 3900);
    assert_eq!(sale.transaction_type, TransactionType::Sale);
    assert_eq!(sale.status, TransactionStatus::Completed);
    // keys come off the front of the pool
    assert_eq!(sale.license_keys, expected_keys);

    let after = queries::get_inventory_line_by_id(&conn, &line.id)
        .unwrap()
        .unwrap();
    assert_eq!(after.quantity_available, 7);
    assert_eq!(after.quantity_sold, 3);
    assert_eq!(after.keys_pool.len(), 7);
    assert!(!after.keys_pool.contains(&expected_keys[0]));
}

#[test]
fn overselling_is_rejected_and_writes_nothing() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (reseller, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 2);

    let result = queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, 5));
    assert!(result.is_err());

    let after = queries::get_inventory_line_by_id(&conn, &line.id)
        .unwrap()
        .unwrap();
    assert_eq!(after.quantity_available, 2);
    assert_eq!(after.quantity_sold, 0);
    assert!(queries::list_sales_for_reseller(&conn, &reseller.id)
        .unwrap()
        .is_empty());
}

#[test]
fn non_positive_quantity_is_rejected_before_any_write() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (reseller, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 2);

    for quantity in [0, -3] {
        let result =
            queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, quantity));
        assert!(result.is_err(), "quantity {} must be rejected", quantity);
    }
}

#[test]
fn deleting_a_sale_restores_the_line() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (reseller, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 10);

    let sale =
        queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, 4)).unwrap();

    let deleted = queries::delete_sale(&mut conn, &reseller.id, &sale.id).unwrap();
    assert!(deleted);

    let after = queries::get_inventory_line_by_id(&conn, &line.id)
        .unwrap()
        .unwrap();
    // available is back to the starting count, sold back to zero
    assert_eq!(after.quantity_available, 10);
    assert_eq!(after.quantity_sold, 0);
    assert_eq!(after.keys_pool.len(), 10);
    // the sold keys returned to the pool
    for key in &sale.license_keys {
        assert!(after.keys_pool.contains(key));
    }

    assert!(queries::get_sale_by_id(&conn, &sale.id).unwrap().is_none());
}

#[test]
fn deleting_a_sale_for_the_wrong_reseller_fails() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (reseller, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 5);
    let other = queries::create_reseller(&conn, &org.id, "Other Shop").unwrap();

    let sale =
        queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, 1)).unwrap();

    assert!(queries::delete_sale(&mut conn, &other.id, &sale.id).is_err());
    // The original sale is untouched
    assert!(queries::get_sale_by_id(&conn, &sale.id).unwrap().is_some());
}

#[test]
fn restock_appends_keys_and_bumps_available() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (_, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 3);

    let after = queries::restock_inventory_line(&mut conn, &line.id, "ACME", 7).unwrap();
    assert_eq!(after.quantity_available, 10);
    assert_eq!(after.keys_pool.len(), 10);
    // Original keys stay at the front
    assert_eq!(&after.keys_pool[..3], &line.keys_pool[..]);
}

#[test]
fn pool_shortfall_is_covered_by_generation() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (reseller, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 5);

    // Simulate a legacy line whose pool is short of its counter
    conn.execute(
        "UPDATE inventory_lines SET keys_pool = '[]' WHERE id = ?1",
        rusqlite::params![&line.id],
    )
    .unwrap();

    let sale =
        queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, 2)).unwrap();
    assert_eq!(sale.license_keys.len(), 2);
    assert!(sale.license_keys.iter().all(|k| k.starts_with("ACME-")));
}

#[test]
fn revenue_sums_completed_sales() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let (reseller, line) = seed_reseller_with_line(&conn, &org.id, &product.id, 10);

    queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, 2)).unwrap();
    queries::record_sale(&mut conn, &reseller.id, "ACME", &sale_input(&line.id, 1)).unwrap();

    assert_eq!(queries::total_sales_revenue_cents(&conn).unwrap(), 3 * 3900);
}
