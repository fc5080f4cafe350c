use serde::Serialize;

use super::ApiClient;
use crate::error::AppResult;
use crate::models::{
    BalanceSheet, CashBalanceReport, ProfitAndLoss, Report, ReportKind, RevenueReport,
    TrialBalance,
};

/// Query parameters accepted by the report endpoints. Range reports use
/// `from`/`to`, point-in-time reports use `as_of`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReportQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<i64>,
}

fn path(kind: ReportKind) -> String {
    format!("/api/v1/reports/{}", kind.slug())
}

pub async fn profit_and_loss(
    api: &ApiClient,
    token: &str,
    query: &ReportQuery,
) -> AppResult<ProfitAndLoss> {
    api.get_query(token, &path(ReportKind::ProfitAndLoss), query)
        .await
}

pub async fn balance_sheet(
    api: &ApiClient,
    token: &str,
    query: &ReportQuery,
) -> AppResult<BalanceSheet> {
    api.get_query(token, &path(ReportKind::BalanceSheet), query)
        .await
}

pub async fn trial_balance(
    api: &ApiClient,
    token: &str,
    query: &ReportQuery,
) -> AppResult<TrialBalance> {
    api.get_query(token, &path(ReportKind::TrialBalance), query)
        .await
}

pub async fn revenue(
    api: &ApiClient,
    token: &str,
    query: &ReportQuery,
) -> AppResult<RevenueReport> {
    api.get_query(token, &path(ReportKind::Revenue), query).await
}

pub async fn cash_balance(
    api: &ApiClient,
    token: &str,
    query: &ReportQuery,
) -> AppResult<CashBalanceReport> {
    api.get_query(token, &path(ReportKind::CashBalance), query)
        .await
}

/// Fetch any report by kind.
pub async fn fetch_report(
    api: &ApiClient,
    token: &str,
    kind: ReportKind,
    query: &ReportQuery,
) -> AppResult<Report> {
    Ok(match kind {
        ReportKind::ProfitAndLoss => {
            Report::ProfitAndLoss(profit_and_loss(api, token, query).await?)
        }
        ReportKind::BalanceSheet => Report::BalanceSheet(balance_sheet(api, token, query).await?),
        ReportKind::TrialBalance => Report::TrialBalance(trial_balance(api, token, query).await?),
        ReportKind::Revenue => Report::Revenue(revenue(api, token, query).await?),
        ReportKind::CashBalance => Report::CashBalance(cash_balance(api, token, query).await?),
    })
}
