use std::cmp::Ordering;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::info;

use super::{form_failure, redirect_failure, PageContext};
use crate::api::journal_types;
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::flash::{self, Flash};
use crate::forms::{self, FieldErrors};
use crate::listing::{self, contains, ListParams, Listable, Page, SortableColumn};
use crate::models::{JournalType, JournalTypePayload};
use crate::state::AppState;

const LIST_PATH: &str = "/finance/journal-types";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum JournalTypeColumn {
    #[default]
    Code,
    Name,
}

impl SortableColumn for JournalTypeColumn {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "code" => Some(Self::Code),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Name => "name",
        }
    }
}

impl Listable for JournalType {
    type Column = JournalTypeColumn;

    fn matches(&self, needle: &str) -> bool {
        contains(&self.code, needle) || contains(&self.name, needle)
    }

    fn compare(&self, other: &Self, column: JournalTypeColumn) -> Ordering {
        match column {
            JournalTypeColumn::Code => self.code.cmp(&other.code),
            JournalTypeColumn::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/journal_types.html")]
pub struct JournalTypesTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub page: Page<JournalType, JournalTypeColumn>,
}

#[derive(Template)]
#[template(path = "pages/journal_type_form.html")]
pub struct JournalTypeFormTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub journal_type_id: Option<i64>,
    pub form: JournalTypeFormData,
    pub errors: FieldErrors,
}

impl JournalTypeFormTemplate {
    pub fn form_action(&self) -> String {
        match self.journal_type_id {
            Some(id) => format!("{}/{}/update", LIST_PATH, id),
            None => format!("{}/create", LIST_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalTypeFormData {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl JournalTypeFormData {
    pub fn validate(&self) -> Result<JournalTypePayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let code = self.code.trim().to_uppercase();

        forms::required(&mut errors, "code", "Code", &code);
        forms::code(&mut errors, "code", &code);
        forms::required(&mut errors, "name", "Name", &self.name);
        forms::max_len(&mut errors, "name", "Name", &self.name, 100);
        forms::max_len(&mut errors, "description", "Description", &self.description, 500);
        errors.into_result()?;

        Ok(JournalTypePayload {
            code,
            name: self.name.trim().to_string(),
            description: forms::non_blank(&self.description),
        })
    }
}

fn render_form(
    state: &AppState,
    cookies: &Cookies,
    current: &CurrentUser,
    journal_type_id: Option<i64>,
    form: JournalTypeFormData,
    errors: FieldErrors,
    toast: Option<Flash>,
) -> AppResult<Html<String>> {
    let mut ctx = PageContext::portal(state, cookies, current, "journal-types");
    if let Some(toast) = toast {
        ctx = ctx.with_flash(toast);
    }
    JournalTypeFormTemplate {
        title: match journal_type_id {
            Some(_) => "Edit journal type".into(),
            None => "New journal type".into(),
        },
        ctx,
        journal_type_id,
        form,
        errors,
    }
    .render_html()
}

pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let types = state.cached_journal_types(&current.token).await?;

    JournalTypesTemplate {
        title: "Journal types".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "journal-types"),
        page: listing::build_page(types, &params),
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
        JournalTypeFormData::default(),
        FieldErrors::new(),
        None,
    )
}

pub async fn edit_form(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    let journal_type = journal_types::get_journal_type(&state.api, &current.token, id).await?;
    let form = JournalTypeFormData {
        code: journal_type.code,
        name: journal_type.name,
        description: journal_type.description.unwrap_or_default(),
    };
    render_form(&state, &cookies, &current, Some(id), form, FieldErrors::new(), None)
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Form(form): Form<JournalTypeFormData>,
) -> AppResult<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(render_form(&state, &cookies, &current, None, form, errors, None)?
                .into_response())
        }
    };

    match journal_types::create_journal_type(&state.api, &current.token, &payload).await {
        Ok(()) => {
            info!(code = %payload.code, "Journal type created");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Journal type {} created.", payload.code)),
            )
            .into_response())
        }
        Err(e) => {
            let (errors, toast) = form_failure(e)?;
            Ok(render_form(&state, &cookies, &current, None, form, errors, Some(toast))?
                .into_response())
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
    Form(form): Form<JournalTypeFormData>,
) -> AppResult<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(
                render_form(&state, &cookies, &current, Some(id), form, errors, None)?
                    .into_response(),
            )
        }
    };

    match journal_types::update_journal_type(&state.api, &current.token, id, &payload).await {
        Ok(()) => {
            info!(id, "Journal type updated");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Journal type {} updated.", payload.code)),
            )
            .into_response())
        }
        Err(e) => {
            let (errors, toast) = form_failure(e)?;
            Ok(
                render_form(&state, &cookies, &current, Some(id), form, errors, Some(toast))?
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
    match journal_types::delete_journal_type(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Journal type deleted");
            Ok(
                flash::redirect_with(&cookies, LIST_PATH, Flash::success("Journal type deleted."))
                    .into_response(),
            )
        }
        Err(e) => Ok(redirect_failure(&cookies, LIST_PATH, e)?.into_response()),
    }
}
