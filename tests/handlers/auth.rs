//! Authorization boundary tests: missing/invalid tokens, role checks, and
//! cross-tenant access.

use axum::http::StatusCode;
use serde_json::json;

use super::helpers::{send, setup};

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let env = setup();
    let (status, _) = send(&env.app, "GET", "/admin/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let env = setup();
    let (status, _) =
        send(&env.app, "GET", "/admin/stats", Some("km_not_a_real_key"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn developer_cannot_reach_admin_routes() {
    let env = setup();
    let (status, _) = send(&env.app, "GET", "/admin/stats", Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_reach_admin_routes() {
    let env = setup();
    let (status, body) = send(&env.app, "GET", "/admin/stats", Some(&env.admin_key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["organizations"], 1);
}

#[tokio::test]
async fn developer_cannot_reach_another_org() {
    let env = setup();
    let (status, _) = send(
        &env.app,
        "GET",
        "/orgs/some-other-org/products",
        Some(&env.dev_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn customer_cannot_reach_org_routes() {
    let env = setup();
    let uri = format!("/orgs/{}/products", env.org_id);
    let (status, _) = send(&env.app, "GET", &uri, Some(&env.customer_key), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reseller_cannot_reach_another_shop() {
    let env = setup();
    let (status, _) = send(
        &env.app,
        "GET",
        "/resellers/some-other-shop/inventory",
        Some(&env.reseller_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_passes_org_routes_for_support() {
    let env = setup();
    let uri = format!("/orgs/{}/stats", env.org_id);
    let (status, _) = send(&env.app, "GET", &uri, Some(&env.admin_key), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn suspended_org_is_locked_out() {
    let env = setup();

    let uri = format!("/admin/organizations/{}", env.org_id);
    let (status, _) = send(
        &env.app,
        "PUT",
        &uri,
        Some(&env.admin_key),
        Some(json!({ "status": "suspended" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/orgs/{}/products", env.org_id);
    let (status, _) = send(&env.app, "GET", &uri, Some(&env.dev_key), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_needs_no_auth() {
    let env = setup();
    let (status, body) = send(&env.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
