//! Integration tests for the director area: divisions, partner types and partners.

mod common;

use axum::http::StatusCode;
use common::{field_error, TestClient};
use serde_json::json;

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_director_dashboard_shows_counts() {
    let client = TestClient::as_director().await;
    let resp = client.get("/director").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Divisions"));
    assert!(resp.body.contains("Partners"));
}

// =============================================================================
// Divisions
// =============================================================================

#[tokio::test]
async fn test_divisions_list() {
    let client = TestClient::as_director().await;
    let resp = client.get("/director/divisions").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Head Office"));
    assert!(resp.body.contains("NKR"));
}

#[tokio::test]
async fn test_divisions_search_filters_rows() {
    let client = TestClient::as_director().await;
    let resp = client.get("/director/divisions?q=nakuru").await;
    assert!(resp.body.contains("Nakuru Branch"));
    assert!(!resp.body.contains("Head Office"));

    let resp = client.get("/director/divisions?q=zzz").await;
    assert!(resp.body.contains("No divisions found."));
}

#[tokio::test]
async fn test_create_division_sends_normalized_payload() {
    let client = TestClient::as_director().await;
    let resp = client
        .post_form(
            "/director/divisions/create",
            &[
                ("name", "  Eldoret Branch "),
                ("code", "eld-01"),
                ("description", ""),
            ],
        )
        .await;
    resp.assert_redirect("/director/divisions");

    let body = client
        .backend
        .last_body("POST", "/api/v1/division")
        .expect("create request");
    assert_eq!(
        body,
        json!({"name": "Eldoret Branch", "code": "ELD-01", "description": null})
    );

    let list = client.follow(&resp).await;
    assert!(list.body.contains("Eldoret Branch"));
    assert!(list.body.contains("created."));
}

#[tokio::test]
async fn test_create_division_validation_errors_stay_local() {
    let client = TestClient::as_director().await;
    let resp = client
        .post_form(
            "/director/divisions/create",
            &[("name", ""), ("code", "bad code!"), ("description", "")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Name is required"));
    assert!(resp.body.contains("Code may only contain letters"));
    assert!(resp.body.contains("bad code!"), "typed value is kept");
    assert_eq!(client.backend.hits("POST", "/api/v1/division"), 0);
}

#[tokio::test]
async fn test_backend_field_errors_are_shown_inline() {
    let client = TestClient::as_director().await;
    client.backend.reject_next(
        422,
        json!({
            "message": "The given data was invalid.",
            "errors": {"code": ["The code has already been taken."]}
        }),
    );

    let resp = client
        .post_form(
            "/director/divisions/create",
            &[("name", "Head Office Two"), ("code", "HQ"), ("description", "")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(&field_error("The code has already been taken.")));
    assert!(resp.body.contains("The given data was invalid."));
    assert!(resp.body.contains("Head Office Two"));
    assert_eq!(client.backend.records("division").len(), 2);
}

#[tokio::test]
async fn test_backend_failure_without_fields_shows_toast() {
    let client = TestClient::as_director().await;
    client
        .backend
        .reject_next(500, json!({"message": "Database is read-only."}));

    let resp = client
        .post_form(
            "/director/divisions/create",
            &[("name", "Kisumu"), ("code", "KSM"), ("description", "")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Database is read-only."));
    assert!(resp.body.contains("toast-error"));
}

#[tokio::test]
async fn test_edit_division_prefills_form() {
    let client = TestClient::as_director().await;
    let resp = client.get("/director/divisions/1/edit").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Head Office"));
    assert!(resp.body.contains("Nairobi head office"));
    assert!(resp.body.contains("/director/divisions/1/update"));
}

#[tokio::test]
async fn test_edit_missing_division_is_404() {
    let client = TestClient::as_director().await;
    let resp = client.get("/director/divisions/999/edit").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.contains("Record not found."));
}

#[tokio::test]
async fn test_update_division() {
    let client = TestClient::as_director().await;
    let resp = client
        .post_form(
            "/director/divisions/2/update",
            &[
                ("name", "Nakuru Town"),
                ("code", "nkr"),
                ("description", "Upcountry branch"),
            ],
        )
        .await;
    resp.assert_redirect("/director/divisions");

    let body = client
        .backend
        .last_body("PUT", "/api/v1/division/2")
        .expect("update request");
    assert_eq!(body["code"], "NKR");
    assert_eq!(body["description"], "Upcountry branch");

    let list = client.follow(&resp).await;
    assert!(list.body.contains("Nakuru Town"));
}

#[tokio::test]
async fn test_delete_division() {
    let client = TestClient::as_director().await;
    let resp = client.post_form("/director/divisions/2/delete", &[]).await;
    resp.assert_redirect("/director/divisions");
    assert_eq!(client.backend.records("division").len(), 1);

    let list = client.follow(&resp).await;
    assert!(list.body.contains("Division deleted."));
    assert!(!list.body.contains("Nakuru Branch"));
}

#[tokio::test]
async fn test_failed_delete_redirects_with_error() {
    let client = TestClient::as_director().await;
    let resp = client.post_form("/director/divisions/999/delete", &[]).await;
    resp.assert_redirect("/director/divisions");

    let list = client.follow(&resp).await;
    assert!(list.body.contains("toast-error"));
}

// =============================================================================
// Cache invalidation
// =============================================================================

#[tokio::test]
async fn test_lists_are_cached_until_a_mutation() {
    let client = TestClient::as_director().await;
    client.get("/director/divisions").await;
    let before = client.backend.hits("GET", "/api/v1/division");
    assert!(before >= 1);

    client.get("/director/divisions").await;
    client.get("/director/divisions?sort=name").await;
    assert_eq!(
        client.backend.hits("GET", "/api/v1/division"),
        before,
        "repeat reads should be served from the cache"
    );

    let resp = client
        .post_form(
            "/director/divisions/create",
            &[("name", "Thika"), ("code", "THK"), ("description", "")],
        )
        .await;
    resp.assert_redirect("/director/divisions");

    let list = client.get("/director/divisions").await;
    assert!(list.body.contains("Thika"));
    assert_eq!(client.backend.hits("GET", "/api/v1/division"), before + 1);
}

#[tokio::test]
async fn test_stale_entries_refetch_after_ttl() {
    let client = TestClient::with_config(|c| c.cache_ttl = std::time::Duration::ZERO).await;
    client.login(common::DIRECTOR_EMAIL).await;

    client.get("/director/divisions").await;
    let before = client.backend.hits("GET", "/api/v1/division");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    client.get("/director/divisions").await;
    assert_eq!(client.backend.hits("GET", "/api/v1/division"), before + 1);
}

// =============================================================================
// Partner types
// =============================================================================

#[tokio::test]
async fn test_partner_type_crud() {
    let client = TestClient::as_director().await;

    let list = client.get("/director/partner-types").await;
    assert!(list.body.contains("Supplier"));
    assert!(list.body.contains("Employer"));

    let resp = client
        .post_form(
            "/director/partner-types/create",
            &[("name", "Insurer"), ("description", "Cover providers")],
        )
        .await;
    resp.assert_redirect("/director/partner-types");
    assert_eq!(
        client.backend.last_body("POST", "/api/v1/partner-type"),
        Some(json!({"name": "Insurer", "description": "Cover providers"}))
    );

    let resp = client
        .post_form(
            "/director/partner-types/2/update",
            &[("name", "Employer Group"), ("description", "")],
        )
        .await;
    resp.assert_redirect("/director/partner-types");

    let resp = client.post_form("/director/partner-types/1/delete", &[]).await;
    resp.assert_redirect("/director/partner-types");
    let list = client.follow(&resp).await;
    assert!(list.body.contains("Partner type deleted."));
    assert!(list.body.contains("Employer Group"));
    assert!(list.body.contains("Insurer"));
}

#[tokio::test]
async fn test_partner_type_name_required() {
    let client = TestClient::as_director().await;
    let resp = client
        .post_form(
            "/director/partner-types/create",
            &[("name", "   "), ("description", "")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Name is required"));
}

// =============================================================================
// Partners
// =============================================================================

#[tokio::test]
async fn test_partner_list_resolves_type_and_division() {
    let client = TestClient::as_director().await;
    let resp = client.get("/director/partners").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Acme Supplies"));
    assert!(resp.body.contains("Supplier"));
    assert!(resp.body.contains("Head Office"));
}

#[tokio::test]
async fn test_partner_form_lists_types_and_divisions() {
    let client = TestClient::as_director().await;
    let resp = client.get("/director/partners/new").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Employer"));
    assert!(resp.body.contains("Nakuru Branch"));
}

#[tokio::test]
async fn test_create_partner_with_optional_fields_blank() {
    let client = TestClient::as_director().await;
    let resp = client
        .post_form(
            "/director/partners/create",
            &[
                ("name", "County Government"),
                ("partner_type_id", "2"),
                ("email", ""),
                ("phone", "+254 700 123456"),
                ("division_id", ""),
            ],
        )
        .await;
    resp.assert_redirect("/director/partners");

    let body = client
        .backend
        .last_body("POST", "/api/v1/partner")
        .expect("create request");
    assert_eq!(body["partner_type_id"], 2);
    assert!(body["email"].is_null());
    assert!(body["division_id"].is_null());
    assert_eq!(body["phone"], "+254 700 123456");
}

#[tokio::test]
async fn test_partner_validation() {
    let client = TestClient::as_director().await;
    let resp = client
        .post_form(
            "/director/partners/create",
            &[
                ("name", "Broken"),
                ("partner_type_id", ""),
                ("email", "not-an-email"),
                ("phone", "call me"),
                ("division_id", ""),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(&field_error("Select a partner type")));
    assert!(resp.body.contains("Enter a valid email address"));
    assert!(resp.body.contains("Enter a valid phone number"));
    assert_eq!(client.backend.hits("POST", "/api/v1/partner"), 0);
}

#[tokio::test]
async fn test_update_and_delete_partner() {
    let client = TestClient::as_director().await;
    let resp = client
        .post_form(
            "/director/partners/1/update",
            &[
                ("name", "Acme Supplies Ltd"),
                ("partner_type_id", "1"),
                ("email", "billing@acme.test"),
                ("phone", ""),
                ("division_id", "2"),
            ],
        )
        .await;
    resp.assert_redirect("/director/partners");
    let body = client
        .backend
        .last_body("PUT", "/api/v1/partner/1")
        .expect("update request");
    assert_eq!(body["division_id"], 2);

    let resp = client.post_form("/director/partners/1/delete", &[]).await;
    resp.assert_redirect("/director/partners");
    assert!(client.backend.records("partner").is_empty());
}
