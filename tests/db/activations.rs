use keymint::db::queries;
use keymint::models::*;

use super::helpers::{license_input, seed_org, seed_product, test_conn};

fn activation_input(key: &str) -> CreateActivation {
    CreateActivation {
        license_key: key.to_string(),
        email: "user@example.com".into(),
        program_name: "Acme Editor".into(),
    }
}

#[test]
fn activation_increments_license_counter() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let license = queries::create_license(
        &conn,
        &org.id,
        &product.id,
        &product.key_prefix,
        &license_input(),
    )
    .unwrap();

    let activation =
        queries::create_activation(&mut conn, &org.id, &activation_input(&license.license_key))
            .unwrap();
    assert_eq!(activation.status, ActivationStatus::Active);

    let after = queries::get_license_by_id(&conn, &license.id).unwrap().unwrap();
    assert_eq!(after.current_activations, 1);
}

#[test]
fn activation_limit_is_enforced() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let license = queries::create_license(
        &conn,
        &org.id,
        &product.id,
        &product.key_prefix,
        &CreateLicense {
            max_activations: 2,
            ..license_input()
        },
    )
    .unwrap();

    for _ in 0..2 {
        queries::create_activation(&mut conn, &org.id, &activation_input(&license.license_key))
            .unwrap();
    }

    let result =
        queries::create_activation(&mut conn, &org.id, &activation_input(&license.license_key));
    assert!(result.is_err());

    let after = queries::get_license_by_id(&conn, &license.id).unwrap().unwrap();
    assert_eq!(after.current_activations, 2);
    assert_eq!(
        queries::list_activations_for_org(&conn, &org.id).unwrap().len(),
        2
    );
}

#[test]
fn deactivation_releases_the_slot() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let license = queries::create_license(
        &conn,
        &org.id,
        &product.id,
        &product.key_prefix,
        &license_input(),
    )
    .unwrap();

    let activation =
        queries::create_activation(&mut conn, &org.id, &activation_input(&license.license_key))
            .unwrap();

    let deactivated =
        queries::deactivate_activation(&mut conn, &org.id, &activation.id).unwrap();
    assert_eq!(deactivated.status, ActivationStatus::Inactive);

    let after = queries::get_license_by_id(&conn, &license.id).unwrap().unwrap();
    assert_eq!(after.current_activations, 0);

    // A second deactivation is a client error
    assert!(queries::deactivate_activation(&mut conn, &org.id, &activation.id).is_err());
}

#[test]
fn activation_against_unknown_key_is_not_found() {
    let mut conn = test_conn();
    let org = seed_org(&conn);

    let result =
        queries::create_activation(&mut conn, &org.id, &activation_input("ACME-XXXX-XXXX"));
    assert!(result.is_err());
}

#[test]
fn activations_listed_per_email() {
    let mut conn = test_conn();
    let org = seed_org(&conn);
    let product = seed_product(&conn, &org.id);
    let license = queries::create_license(
        &conn,
        &org.id,
        &product.id,
        &product.key_prefix,
        &license_input(),
    )
    .unwrap();

    queries::create_activation(&mut conn, &org.id, &activation_input(&license.license_key))
        .unwrap();

    let mine = queries::list_activations_for_email(&conn, "user@example.com").unwrap();
    assert_eq!(mine.len(), 1);
    assert!(
        queries::list_activations_for_email(&conn, "other@example.com")
            .unwrap()
            .is_empty()
    );
}
