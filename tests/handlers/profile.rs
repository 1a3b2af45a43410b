//! Profile and credential management.

use axum::http::StatusCode;
use serde_json::json;

use super::helpers::{send, setup};

#[tokio::test]
async fn profile_reflects_the_session_user() {
    let env = setup();
    let (status, body) = send(&env.app, "GET", "/me", Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "dev@acme.test");
    assert_eq!(body["role"], "developer");
}

#[tokio::test]
async fn display_name_can_be_updated() {
    let env = setup();
    let (status, body) = send(
        &env.app,
        "PUT",
        "/me",
        Some(&env.dev_key),
        Some(json!({ "name": "Dana Developer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dana Developer");

    let (status, _) = send(
        &env.app,
        "PUT",
        "/me",
        Some(&env.dev_key),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn key_rotation_invalidates_the_old_key() {
    let env = setup();

    let (status, body) = send(&env.app, "POST", "/me/rotate-key", Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::OK);
    let new_key = body["api_key"].as_str().unwrap().to_string();
    assert!(new_key.starts_with("km_"));

    // Old key is rejected, new key works
    let (status, _) = send(&env.app, "GET", "/me", Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&env.app, "GET", "/me", Some(&new_key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "dev@acme.test");
}

#[tokio::test]
async fn admin_creates_an_org_with_owner_credentials() {
    let env = setup();

    let (status, body) = send(
        &env.app,
        "POST",
        "/admin/organizations",
        Some(&env.admin_key),
        Some(json!({ "name": "Newco", "owner_email": "owner@newco.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let org_id = body["organization"]["id"].as_str().unwrap().to_string();
    let owner_key = body["owner_api_key"].as_str().unwrap().to_string();

    // The issued key signs into the new org immediately
    let uri = format!("/orgs/{}/products", org_id);
    let (status, _) = send(&env.app, "GET", &uri, Some(&owner_key), None).await;
    assert_eq!(status, StatusCode::OK);
}
