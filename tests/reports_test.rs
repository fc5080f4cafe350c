//! Integration tests for report pages, period filters and CSV export.

mod common;

use axum::http::{header, StatusCode};
use chrono::{Datelike, Local};
use common::TestClient;

#[tokio::test]
async fn test_reports_index_lists_every_report() {
    let client = TestClient::as_finance().await;
    let resp = client.get("/reports").await;
    assert_eq!(resp.status, StatusCode::OK);
    for slug in [
        "profit-and-loss",
        "balance-sheet",
        "trial-balance",
        "revenue",
        "cash-balance",
    ] {
        assert!(
            resp.body.contains(&format!("/reports/{}", slug)),
            "missing link to {}",
            slug
        );
    }
}

#[tokio::test]
async fn test_profit_and_loss_defaults_to_this_month() {
    let client = TestClient::as_director().await;
    let resp = client.get("/reports/profit-and-loss").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Interest Income"));
    assert!(resp.body.contains("1,250.50"));
    assert!(resp.body.contains("450.50"), "net profit");

    let today = Local::now().date_naive();
    let month_start = format!("from={}-{:02}-01", today.year(), today.month());
    let query = client
        .backend
        .last_query("/api/v1/reports/profit-and-loss")
        .expect("report query");
    assert!(query.contains(&month_start), "query was {}", query);
    assert!(query.contains("to="));
    assert!(!query.contains("as_of"));
}

#[tokio::test]
async fn test_custom_range_and_division_are_forwarded() {
    let client = TestClient::as_finance().await;
    let resp = client
        .get("/reports/revenue?from=2025-01-01&to=2025-03-31&division_id=2")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Loan Interest"));
    assert!(resp.body.contains("900.00"));

    let query = client
        .backend
        .last_query("/api/v1/reports/revenue")
        .expect("report query");
    assert_eq!(query, "from=2025-01-01&to=2025-03-31&division_id=2");
}

#[tokio::test]
async fn test_range_navigation_steps_by_period() {
    let client = TestClient::as_finance().await;
    client
        .get("/reports/revenue?from=2025-01-01&to=2025-03-31&nav=prev")
        .await;
    let query = client
        .backend
        .last_query("/api/v1/reports/revenue")
        .expect("report query");
    assert_eq!(query, "from=2024-10-01&to=2024-12-31");
}

#[tokio::test]
async fn test_empty_division_filter_is_ignored() {
    let client = TestClient::as_finance().await;
    client
        .get("/reports/trial-balance?as_of=2025-06-30&division_id=")
        .await;
    let query = client
        .backend
        .last_query("/api/v1/reports/trial-balance")
        .expect("report query");
    assert_eq!(query, "as_of=2025-06-30");
}

#[tokio::test]
async fn test_balance_sheet_as_of() {
    let client = TestClient::as_finance().await;
    let resp = client.get("/reports/balance-sheet?as_of=2025-03-31").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("As of March 31, 2025"));
    assert!(resp.body.contains("Member Deposits"));
    assert!(resp.body.contains("Share Capital"));
    assert!(resp.body.contains("Head Office"), "division filter is offered");

    let query = client
        .backend
        .last_query("/api/v1/reports/balance-sheet")
        .expect("report query");
    assert_eq!(query, "as_of=2025-03-31");
}

#[tokio::test]
async fn test_trial_balance_totals() {
    let client = TestClient::as_finance().await;
    let resp = client.get("/reports/trial-balance?as_of=2025-03-31").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Cash and Bank"));
    assert!(!resp.body.contains("Out of balance"));
}

#[tokio::test]
async fn test_cash_balance_report() {
    let client = TestClient::as_director().await;
    let resp = client.get("/reports/cash-balance").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Main Till"));
    assert!(resp.body.contains("Total cash"));
}

#[tokio::test]
async fn test_unknown_report_is_404() {
    let client = TestClient::as_finance().await;
    let resp = client.get("/reports/cash-flow").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = client.get("/reports/cash-flow/export").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_balance_sheet_csv() {
    let client = TestClient::as_finance().await;
    let resp = client
        .get("/reports/balance-sheet/export?as_of=2025-03-31")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.header(header::CONTENT_TYPE),
        Some("text/csv; charset=utf-8")
    );
    assert_eq!(
        resp.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"balance-sheet_2025-03-31.csv\"")
    );

    let mut lines = resp.body.lines();
    assert_eq!(lines.next(), Some("Section,Code,Name,Amount"));
    assert!(resp.body.contains("Assets,1000,Cash and Bank,1500.00"));
    assert!(resp.body.contains("Total assets"));
}

#[tokio::test]
async fn test_export_range_report_filename() {
    let client = TestClient::as_director().await;
    let resp = client
        .get("/reports/profit-and-loss/export?from=2025-01-01&to=2025-01-31")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"profit-and-loss_2025-01-01_2025-01-31.csv\"")
    );
    assert!(resp.body.contains("Net profit"));
}

#[tokio::test]
async fn test_trial_balance_export_columns() {
    let client = TestClient::as_finance().await;
    let resp = client
        .get("/reports/trial-balance/export?as_of=2025-03-31")
        .await;
    assert_eq!(resp.body.lines().next(), Some("Code,Account,Debit,Credit"));
}
