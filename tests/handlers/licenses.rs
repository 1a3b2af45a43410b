//! License issuance and export flows over the HTTP surface.

use std::collections::HashSet;

use axum::http::StatusCode;
use serde_json::json;

use super::helpers::{send, setup};

#[tokio::test]
async fn bulk_issuance_returns_n_distinct_keys() {
    let env = setup();
    let uri = format!("/orgs/{}/licenses", env.org_id);

    let (status, body) = send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": env.product_id, "count": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let licenses = body["licenses"].as_array().unwrap();
    assert_eq!(licenses.len(), 5);

    let keys: HashSet<&str> = licenses
        .iter()
        .map(|l| l["license_key"].as_str().unwrap())
        .collect();
    assert_eq!(keys.len(), 5);
    assert!(keys.iter().all(|k| k.starts_with("ACME-")));
}

#[tokio::test]
async fn zero_and_oversized_counts_are_rejected() {
    let env = setup();
    let uri = format!("/orgs/{}/licenses", env.org_id);

    for count in [0, -5, 101] {
        let (status, _) = send(
            &env.app,
            "POST",
            &uri,
            Some(&env.dev_key),
            Some(json!({ "product_id": env.product_id, "count": count })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "count {}", count);
    }

    // Nothing was created
    let (_, body) = send(&env.app, "GET", &uri, Some(&env.dev_key), None).await;
    assert_eq!(body["page_info"]["total_items"], 0);
}

#[tokio::test]
async fn issuance_against_foreign_product_is_not_found() {
    let env = setup();

    // A product under a different org
    let conn = env.state.db.get().unwrap();
    let other_org = keymint::db::queries::create_organization(
        &conn,
        &keymint::models::CreateOrganization {
            name: "Rival".into(),
            owner_email: "r@rival.test".into(),
            owner_name: None,
            plan: keymint::models::OrgPlan::Free,
        },
    )
    .unwrap();
    let foreign = keymint::db::queries::create_product(
        &conn,
        &other_org.id,
        &keymint::models::CreateProduct {
            name: "Rival App".into(),
            description: None,
            price_cents: 0,
            key_prefix: "RVL".into(),
            license_duration_days: None,
            max_activations: 1,
        },
    )
    .unwrap();
    drop(conn);

    let uri = format!("/orgs/{}/licenses", env.org_id);
    let (status, _) = send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": foreign.id, "count": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_supports_search_and_pagination() {
    let env = setup();
    let uri = format!("/orgs/{}/licenses", env.org_id);

    send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": env.product_id, "count": 5 })),
    )
    .await;

    // Page 3 of 5 items at 2 per page holds the remainder
    let paged = format!("{}?page=3&per_page=2", uri);
    let (status, body) = send(&env.app, "GET", &paged, Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["page_info"]["total_pages"], 3);
    assert_eq!(body["page_info"]["has_next"], false);
    assert_eq!(body["page_info"]["has_prev"], true);

    // Search on the product name matches everything; a nonsense query nothing
    let searched = format!("{}?q=acme+editor", uri);
    let (_, body) = send(&env.app, "GET", &searched, Some(&env.dev_key), None).await;
    assert_eq!(body["page_info"]["total_items"], 5);

    let searched = format!("{}?q=no-such-thing", uri);
    let (_, body) = send(&env.app, "GET", &searched, Some(&env.dev_key), None).await;
    assert_eq!(body["page_info"]["total_items"], 0);
}

#[tokio::test]
async fn key_list_export_is_newline_joined() {
    let env = setup();
    let uri = format!("/orgs/{}/licenses", env.org_id);

    send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": env.product_id, "count": 3 })),
    )
    .await;

    let export = format!("{}/export.txt", uri);
    let (status, body) = send(&env.app, "GET", &export, Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::OK);

    let text = body.as_str().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.starts_with("ACME-")));
}

#[tokio::test]
async fn csv_export_has_header_and_rows() {
    let env = setup();
    let uri = format!("/orgs/{}/licenses", env.org_id);

    send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": env.product_id, "count": 2 })),
    )
    .await;

    let export = format!("{}/export.csv", uri);
    let (status, body) = send(&env.app, "GET", &export, Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::OK);

    let text = body.as_str().unwrap();
    let mut lines = text.split("\r\n");
    assert!(lines.next().unwrap().starts_with("license_key,product,status"));
    assert_eq!(lines.filter(|l| !l.is_empty()).count(), 2);
}

#[tokio::test]
async fn expiry_follows_product_duration() {
    let env = setup();
    let uri = format!("/orgs/{}/licenses", env.org_id);

    let before = chrono::Utc::now().timestamp();
    let (_, body) = send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": env.product_id, "count": 1 })),
    )
    .await;

    // Product default is 365 days
    let expires_at = body["licenses"][0]["expires_at"].as_i64().unwrap();
    assert!(expires_at >= before + 365 * 86400);
    assert!(expires_at <= chrono::Utc::now().timestamp() + 365 * 86400 + 5);

    // A numeric override wins over the product default
    let (_, body) = send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": env.product_id, "count": 1, "duration_days": 30 })),
    )
    .await;
    let expires_at = body["licenses"][0]["expires_at"].as_i64().unwrap();
    assert!(expires_at <= before + 31 * 86400);

    // A product without a duration issues perpetual licenses
    let products = format!("/orgs/{}/products", env.org_id);
    let (_, body) = send(
        &env.app,
        "POST",
        &products,
        Some(&env.dev_key),
        Some(json!({ "name": "Acme Lite", "key_prefix": "LITE" })),
    )
    .await;
    let lite_id = body["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": lite_id, "count": 1 })),
    )
    .await;
    assert!(body["licenses"][0]["expires_at"].is_null());
}

#[tokio::test]
async fn status_update_and_delete() {
    let env = setup();
    let uri = format!("/orgs/{}/licenses", env.org_id);

    let (_, body) = send(
        &env.app,
        "POST",
        &uri,
        Some(&env.dev_key),
        Some(json!({ "product_id": env.product_id, "count": 1 })),
    )
    .await;
    let id = body["licenses"][0]["id"].as_str().unwrap().to_string();

    let item = format!("{}/{}", uri, id);
    let (status, body) = send(
        &env.app,
        "PUT",
        &item,
        Some(&env.dev_key),
        Some(json!({ "status": "revoked" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "revoked");

    let (status, _) = send(&env.app, "DELETE", &item, Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&env.app, "GET", &item, Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
