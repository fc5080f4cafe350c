use std::borrow::Borrow;
use std::cmp::Ordering;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::info;

use super::{form_failure, redirect_failure, PageContext};
use crate::api::accounts;
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::flash::{self, Flash};
use crate::forms::{self, deserialize_optional_i64, FieldErrors};
use crate::listing::{self, contains, ListParams, Listable, Page, SortableColumn};
use crate::models::{Account, AccountPayload, ChartOfAccount, Division};
use crate::state::AppState;

const LIST_PATH: &str = "/finance/accounts";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum AccountColumn {
    #[default]
    Number,
    Name,
    Category,
    Balance,
}

impl SortableColumn for AccountColumn {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "number" => Some(Self::Number),
            "name" => Some(Self::Name),
            "category" => Some(Self::Category),
            "balance" => Some(Self::Balance),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Name => "name",
            Self::Category => "category",
            Self::Balance => "balance",
        }
    }
}

impl Listable for Account {
    type Column = AccountColumn;

    fn matches(&self, needle: &str) -> bool {
        contains(&self.number, needle)
            || contains(&self.name, needle)
            || self.coa_name.as_deref().is_some_and(|c| contains(c, needle))
    }

    fn compare(&self, other: &Self, column: AccountColumn) -> Ordering {
        match column {
            AccountColumn::Number => self.number.cmp(&other.number),
            AccountColumn::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
            AccountColumn::Category => self.coa_name.cmp(&other.coa_name),
            AccountColumn::Balance => self.balance.cmp(&other.balance),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/accounts.html")]
pub struct AccountsTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub page: Page<Account, AccountColumn>,
    pub total_balance: i64,
}

#[derive(Template)]
#[template(path = "pages/account_form.html")]
pub struct AccountFormTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub account_id: Option<i64>,
    pub form: AccountFormData,
    pub errors: FieldErrors,
    pub coa: Vec<ChartOfAccount>,
    pub divisions: Vec<Division>,
}

impl AccountFormTemplate {
    pub fn form_action(&self) -> String {
        match self.account_id {
            Some(id) => format!("{}/{}/update", LIST_PATH, id),
            None => format!("{}/create", LIST_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountFormData {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub coa_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub division_id: Option<i64>,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl Default for AccountFormData {
    fn default() -> Self {
        Self {
            number: String::new(),
            name: String::new(),
            coa_id: None,
            division_id: None,
            is_active: Some("on".into()),
        }
    }
}

impl AccountFormData {
    fn from_account(account: &Account) -> Self {
        Self {
            number: account.number.clone(),
            name: account.name.clone(),
            coa_id: Some(account.coa_id),
            division_id: account.division_id,
            is_active: account.is_active.then(|| "on".to_string()),
        }
    }

    pub fn active(&self) -> bool {
        self.is_active.is_some()
    }

    pub fn coa_selected(&self, id: impl Borrow<i64>) -> bool {
        self.coa_id == Some(*id.borrow())
    }

    pub fn division_selected(&self, id: impl Borrow<i64>) -> bool {
        self.division_id == Some(*id.borrow())
    }

    pub fn validate(&self) -> Result<AccountPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let number = self.number.trim().to_uppercase();

        forms::required(&mut errors, "number", "Account number", &number);
        forms::code(&mut errors, "number", &number);
        forms::required(&mut errors, "name", "Name", &self.name);
        forms::max_len(&mut errors, "name", "Name", &self.name, 150);
        forms::required_id(&mut errors, "coa_id", "Chart-of-accounts record", self.coa_id);
        errors.into_result()?;

        Ok(AccountPayload {
            number,
            name: self.name.trim().to_string(),
            coa_id: self.coa_id.unwrap_or_default(),
            division_id: self.division_id,
            is_active: self.active(),
        })
    }
}

async fn render_form(
    state: &AppState,
    cookies: &Cookies,
    current: &CurrentUser,
    account_id: Option<i64>,
    form: AccountFormData,
    errors: FieldErrors,
    toast: Option<Flash>,
) -> AppResult<Html<String>> {
    let (coa, divisions) = tokio::try_join!(
        state.cached_coa(&current.token),
        state.cached_divisions(&current.token),
    )?;

    let mut ctx = PageContext::portal(state, cookies, current, "accounts");
    if let Some(toast) = toast {
        ctx = ctx.with_flash(toast);
    }
    AccountFormTemplate {
        title: match account_id {
            Some(_) => "Edit account".into(),
            None => "New account".into(),
        },
        ctx,
        account_id,
        form,
        errors,
        coa,
        divisions,
    }
    .render_html()
}

pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let (mut account_list, coa) = tokio::try_join!(
        state.cached_accounts(&current.token),
        state.cached_coa(&current.token),
    )?;

    for account in &mut account_list {
        if account.coa_name.is_none() {
            account.coa_name = coa
                .iter()
                .find(|c| c.id == account.coa_id)
                .map(|c| c.name.clone());
        }
    }
    let total_balance = account_list.iter().map(|a| a.balance).sum();

    AccountsTemplate {
        title: "Accounts".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "accounts"),
        page: listing::build_page(account_list, &params),
        total_balance,
    }
    .render_html()
}

pub async fn new_form(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    render_form(
        &state,
        &cookies,
        &current,
        None,
        AccountFormData::default(),
        FieldErrors::new(),
        None,
    )
    .await
}

pub async fn edit_form(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    let account = accounts::get_account(&state.api, &current.token, id).await?;
    render_form(
        &state,
        &cookies,
        &current,
        Some(id),
        AccountFormData::from_account(&account),
        FieldErrors::new(),
        None,
    )
    .await
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Form(form): Form<AccountFormData>,
) -> AppResult<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(
                render_form(&state, &cookies, &current, None, form, errors, None)
                    .await?
                    .into_response(),
            )
        }
    };

    match accounts::create_account(&state.api, &current.token, &payload).await {
        Ok(()) => {
            info!(number = %payload.number, "Account created");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Account {} created.", payload.number)),
            )
            .into_response())
        }
        Err(e) => {
            let (errors, toast) = form_failure(e)?;
            Ok(
                render_form(&state, &cookies, &current, None, form, errors, Some(toast))
                    .await?
                    .into_response(),
            )
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<AccountFormData>,
) -> AppResult<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(
                render_form(&state, &cookies, &current, Some(id), form, errors, None)
                    .await?
                    .into_response(),
            )
        }
    };

    match accounts::update_account(&state.api, &current.token, id, &payload).await {
        Ok(()) => {
            info!(id, "Account updated");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Account {} updated.", payload.number)),
            )
            .into_response())
        }
        Err(e) => {
            let (errors, toast) = form_failure(e)?;
            Ok(
                render_form(&state, &cookies, &current, Some(id), form, errors, Some(toast))
                    .await?
                    .into_response(),
            )
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    match accounts::delete_account(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Account deleted");
            Ok(flash::redirect_with(&cookies, LIST_PATH, Flash::success("Account deleted."))
                .into_response())
        }
        Err(e) => Ok(redirect_failure(&cookies, LIST_PATH, e)?.into_response()),
    }
}
