use keymint::db::queries;
use keymint::models::*;

use super::helpers::{seed_org, seed_product, test_conn};

#[test]
fn create_and_fetch_organization() {
    let conn = test_conn();
    let org = seed_org(&conn);

    let fetched = queries::get_organization_by_id(&conn, &org.id)
        .unwrap()
        .unwrap();
    assert_eq!(fetched.name, "Acme Software");
    assert_eq!(fetched.plan, OrgPlan::Pro);
    assert_eq!(fetched.status, OrgStatus::Active);
}

#[test]
fn update_organization_is_partial() {
    let conn = test_conn();
    let org = seed_org(&conn);

    queries::update_organization(
        &conn,
        &org.id,
        &UpdateOrganization {
            name: None,
            plan: None,
            status: Some(OrgStatus::Suspended),
        },
    )
    .unwrap();

    let fetched = queries::get_organization_by_id(&conn, &org.id)
        .unwrap()
        .unwrap();
    // Untouched fields survive a status-only update
    assert_eq!(fetched.name, "Acme Software");
    assert_eq!(fetched.plan, OrgPlan::Pro);
    assert_eq!(fetched.status, OrgStatus::Suspended);
}

#[test]
fn organizations_paginate_with_total() {
    let conn = test_conn();
    for i in 0..5 {
        queries::create_organization(
            &conn,
            &CreateOrganization {
                name: format!("Org {}", i),
                owner_email: format!("owner{}@test", i),
                owner_name: None,
                plan: OrgPlan::Free,
            },
        )
        .unwrap();
    }

    let (page, total) = queries::list_organizations_paginated(&conn, 2, 2).unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);
}

#[test]
fn product_update_can_null_duration() {
    let conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    assert_eq!(product.license_duration_days, Some(365));

    queries::update_product(
        &conn,
        &product.id,
        &UpdateProduct {
            name: None,
            description: None,
            price_cents: None,
            key_prefix: None,
            license_duration_days: Some(None),
            max_activations: None,
            status: None,
        },
    )
    .unwrap();

    let fetched = queries::get_product_by_id(&conn, &product.id).unwrap().unwrap();
    assert_eq!(fetched.license_duration_days, None);
}

#[test]
fn customer_email_unique_per_org() {
    let conn = test_conn();
    let org = seed_org(&conn);

    let input = CreateCustomer {
        name: "Jo".into(),
        email: "jo@example.com".into(),
    };
    queries::create_customer(&conn, &org.id, &input).unwrap();
    assert!(queries::create_customer(&conn, &org.id, &input).is_err());

    // Same email under a different org is fine
    let other = queries::create_organization(
        &conn,
        &CreateOrganization {
            name: "Other".into(),
            owner_email: "o@test".into(),
            owner_name: None,
            plan: OrgPlan::Free,
        },
    )
    .unwrap();
    assert!(queries::create_customer(&conn, &other.id, &input).is_ok());
}

#[test]
fn api_key_round_trip_and_rotation() {
    let conn = test_conn();
    let user = queries::create_user(
        &conn,
        &CreateUser {
            email: "dev@acme.test".into(),
            name: "Dev".into(),
            role: Role::Developer,
            org_id: None,
            reseller_id: None,
        },
    )
    .unwrap();

    let (_, key) = queries::create_api_key(&conn, &user.id).unwrap();
    assert!(key.starts_with("km_"));

    let resolved = queries::get_user_by_api_key(&conn, &key).unwrap().unwrap();
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.role, Role::Developer);

    let (_, new_key) = queries::rotate_api_key(&conn, &user.id).unwrap();
    assert_ne!(new_key, key);
    // Old key is dead, new key works
    assert!(queries::get_user_by_api_key(&conn, &key).unwrap().is_none());
    assert!(
        queries::get_user_by_api_key(&conn, &new_key)
            .unwrap()
            .is_some()
    );
}

#[test]
fn bootstrap_admin_runs_once() {
    let conn = test_conn();

    let first = queries::bootstrap_admin(&conn, "root@keymint.test").unwrap();
    assert!(first.is_some());

    let second = queries::bootstrap_admin(&conn, "root@keymint.test").unwrap();
    assert!(second.is_none());
}

#[test]
fn deleting_org_cascades_to_children() {
    let conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    queries::create_license(&conn, &org.id, &product.id, "ACME", &super::helpers::license_input())
        .unwrap();

    queries::delete_organization(&conn, &org.id).unwrap();

    assert!(queries::get_product_by_id(&conn, &product.id).unwrap().is_none());
    assert_eq!(queries::count_licenses(&conn).unwrap(), 0);
}
