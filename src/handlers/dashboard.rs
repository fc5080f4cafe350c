use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tower_cookies::Cookies;
use tracing::debug;

use super::PageContext;
use crate::api::journals::{self, JournalFilter};
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::models::{Account, ChartOfAccount, CoaCategory, Journal, ReportKind};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/director_dashboard.html")]
pub struct DirectorDashboardTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub division_count: usize,
    pub partner_count: usize,
    pub partner_type_count: usize,
    pub reports: &'static [ReportKind],
}

#[derive(Template)]
#[template(path = "pages/finance_dashboard.html")]
pub struct FinanceDashboardTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub coa_count: usize,
    pub account_count: usize,
    pub journal_type_count: usize,
    pub draft_journals: Vec<Journal>,
    pub total_assets: i64,
    pub reports: &'static [ReportKind],
}

pub async fn director(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let (divisions, partners, partner_types) = tokio::try_join!(
        state.cached_divisions(&current.token),
        state.cached_partners(&current.token),
        state.cached_partner_types(&current.token),
    )?;

    debug!(
        divisions = divisions.len(),
        partners = partners.len(),
        partner_types = partner_types.len(),
        "Director dashboard loaded"
    );

    DirectorDashboardTemplate {
        title: "Director dashboard".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "dashboard"),
        division_count: divisions.len(),
        partner_count: partners.len(),
        partner_type_count: partner_types.len(),
        reports: ReportKind::all(),
    }
    .render_html()
}

pub async fn finance(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let draft_filter = JournalFilter {
        status: Some("draft".into()),
        ..Default::default()
    };
    let (coa, accounts, journal_types, draft_journals) = tokio::try_join!(
        state.cached_coa(&current.token),
        state.cached_accounts(&current.token),
        state.cached_journal_types(&current.token),
        journals::list_journals(&state.api, &current.token, &draft_filter),
    )?;

    let total_assets = asset_total(&coa, &accounts);

    debug!(
        coa = coa.len(),
        accounts = accounts.len(),
        drafts = draft_journals.len(),
        "Finance dashboard loaded"
    );

    FinanceDashboardTemplate {
        title: "Finance dashboard".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "dashboard"),
        coa_count: coa.len(),
        account_count: accounts.len(),
        journal_type_count: journal_types.len(),
        draft_journals: draft_journals
            .into_iter()
            .filter(|j| j.is_draft())
            .take(5)
            .collect(),
        total_assets,
        reports: ReportKind::all(),
    }
    .render_html()
}

/// Sum of balances held in accounts filed under an asset category.
fn asset_total(coa: &[ChartOfAccount], accounts: &[Account]) -> i64 {
    accounts
        .iter()
        .filter(|a| {
            coa.iter()
                .any(|c| c.id == a.coa_id && c.category == CoaCategory::Asset)
        })
        .map(|a| a.balance)
        .fold(0, i64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coa(id: i64, category: CoaCategory) -> ChartOfAccount {
        ChartOfAccount {
            id,
            code: id.to_string(),
            name: format!("COA {id}"),
            category,
            parent_id: None,
            description: None,
            is_active: true,
        }
    }

    fn account(id: i64, coa_id: i64, balance: i64) -> Account {
        Account {
            id,
            number: format!("ACC-{id}"),
            name: "Account".into(),
            coa_id,
            coa_name: None,
            division_id: None,
            balance,
            is_active: true,
        }
    }

    #[test]
    fn test_asset_total_skips_other_categories() {
        let chart = vec![
            coa(1, CoaCategory::Asset),
            coa(2, CoaCategory::Income),
            coa(3, CoaCategory::Liability),
        ];
        let accounts = vec![
            account(1, 1, 150_000),
            account(2, 2, 25_000),
            account(3, 3, 90_000),
            account(4, 1, -10_000),
            account(5, 99, 5_000),
        ];
        assert_eq!(asset_total(&chart, &accounts), 140_000);
    }
}
