//! Chart-of-accounts maintenance for the finance role.

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
use crate::api::coa;
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::flash::{self, Flash};
use crate::forms::{self, deserialize_optional_i64, FieldErrors};
use crate::listing::{self, contains, ListParams, Listable, Page, SortableColumn};
use crate::models::{ChartOfAccount, CoaCategory, CoaPayload};
use crate::state::AppState;

const LIST_PATH: &str = "/finance/coa";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum CoaColumn {
    #[default]
    Code,
    Name,
    Category,
}

impl SortableColumn for CoaColumn {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "code" => Some(Self::Code),
            "name" => Some(Self::Name),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Name => "name",
            Self::Category => "category",
        }
    }
}

impl Listable for ChartOfAccount {
    type Column = CoaColumn;

    fn matches(&self, needle: &str) -> bool {
        contains(&self.code, needle)
            || contains(&self.name, needle)
            || contains(self.category.label(), needle)
    }

    fn compare(&self, other: &Self, column: CoaColumn) -> Ordering {
        match column {
            CoaColumn::Code => self.code.cmp(&other.code),
            CoaColumn::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
            CoaColumn::Category => (self.category as u8)
                .cmp(&(other.category as u8))
                .then_with(|| self.code.cmp(&other.code)),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/coa.html")]
pub struct CoaListTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub page: Page<ChartOfAccount, CoaColumn>,
    pub parents: Vec<ChartOfAccount>,
}

impl CoaListTemplate {
    pub fn parent_name(&self, id: impl Borrow<Option<i64>>) -> String {
        (*id.borrow())
            .and_then(|id| self.parents.iter().find(|c| c.id == id))
            .map(|c| c.display_name())
            .unwrap_or_else(|| "-".into())
    }
}

#[derive(Template)]
#[template(path = "pages/coa_form.html")]
pub struct CoaFormTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub coa_id: Option<i64>,
    pub form: CoaFormData,
    pub errors: FieldErrors,
    pub categories: &'static [CoaCategory],
    pub parents: Vec<ChartOfAccount>,
}

impl CoaFormTemplate {
    pub fn form_action(&self) -> String {
        match self.coa_id {
            Some(id) => format!("{}/{}/update", LIST_PATH, id),
            None => format!("{}/create", LIST_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoaFormData {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl Default for CoaFormData {
    fn default() -> Self {
        Self {
            code: String::new(),
            name: String::new(),
            category: String::new(),
            parent_id: None,
            description: String::new(),
            is_active: Some("on".into()),
        }
    }
}

impl CoaFormData {
    fn from_coa(record: &ChartOfAccount) -> Self {
        Self {
            code: record.code.clone(),
            name: record.name.clone(),
            category: record.category.as_str().to_string(),
            parent_id: record.parent_id,
            description: record.description.clone().unwrap_or_default(),
            is_active: record.is_active.then(|| "on".to_string()),
        }
    }

    pub fn active(&self) -> bool {
        self.is_active.is_some()
    }

    pub fn category_selected(&self, category: &CoaCategory) -> bool {
        CoaCategory::parse(&self.category) == Some(*category)
    }

    pub fn parent_selected(&self, id: impl Borrow<i64>) -> bool {
        self.parent_id == Some(*id.borrow())
    }

    pub fn validate(&self) -> Result<CoaPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let code = self.code.trim().to_uppercase();

        forms::required(&mut errors, "code", "Code", &code);
        forms::code(&mut errors, "code", &code);
        forms::required(&mut errors, "name", "Name", &self.name);
        forms::max_len(&mut errors, "name", "Name", &self.name, 150);
        let category = CoaCategory::parse(&self.category);
        if category.is_none() {
            errors.add("category", "Select a category");
        }
        forms::max_len(&mut errors, "description", "Description", &self.description, 500);
        errors.into_result()?;

        Ok(CoaPayload {
            code,
            name: self.name.trim().to_string(),
            category: category.unwrap_or(CoaCategory::Asset),
            parent_id: self.parent_id,
            description: forms::non_blank(&self.description),
            is_active: self.active(),
        })
    }
}

async fn render_form(
    state: &AppState,
    cookies: &Cookies,
    current: &CurrentUser,
    coa_id: Option<i64>,
    form: CoaFormData,
    errors: FieldErrors,
    toast: Option<Flash>,
) -> AppResult<Html<String>> {
    let parents = state
        .cached_coa(&current.token)
        .await?
        .into_iter()
        .filter(|c| Some(c.id) != coa_id)
        .collect();

    let mut ctx = PageContext::portal(state, cookies, current, "coa");
    if let Some(toast) = toast {
        ctx = ctx.with_flash(toast);
    }
    CoaFormTemplate {
        title: match coa_id {
            Some(_) => "Edit account category".into(),
            None => "New account category".into(),
        },
        ctx,
        coa_id,
        form,
        errors,
        categories: CoaCategory::all(),
        parents,
    }
    .render_html()
}

pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let records = state.cached_coa(&current.token).await?;
    let parents = records.clone();

    CoaListTemplate {
        title: "Chart of accounts".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "coa"),
        page: listing::build_page(records, &params),
        parents,
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
        CoaFormData::default(),
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
    let record = coa::get_coa(&state.api, &current.token, id).await?;
    render_form(
        &state,
        &cookies,
        &current,
        Some(id),
        CoaFormData::from_coa(&record),
        FieldErrors::new(),
        None,
    )
    .await
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Form(form): Form<CoaFormData>,
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

    match coa::create_coa(&state.api, &current.token, &payload).await {
        Ok(()) => {
            info!(code = %payload.code, "Chart-of-accounts record created");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("{} {} created.", payload.code, payload.name)),
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
    Form(form): Form<CoaFormData>,
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

    if payload.parent_id == Some(id) {
        let mut errors = FieldErrors::new();
        errors.add("parent_id", "A record cannot be its own parent");
        return Ok(
            render_form(&state, &cookies, &current, Some(id), form, errors, None)
                .await?
                .into_response(),
        );
    }

    match coa::update_coa(&state.api, &current.token, id, &payload).await {
        Ok(()) => {
            info!(id, "Chart-of-accounts record updated");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("{} {} updated.", payload.code, payload.name)),
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
    match coa::delete_coa(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Chart-of-accounts record deleted");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success("Chart-of-accounts record deleted."),
            )
            .into_response())
        }
        Err(e) => Ok(redirect_failure(&cookies, LIST_PATH, e)?.into_response()),
    }
}
