use std::cmp::Ordering;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::info;

use super::{form_failure, redirect_failure, PageContext};
use crate::api::divisions;
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::flash::{self, Flash};
use crate::forms::{self, FieldErrors};
use crate::listing::{self, contains, ListParams, Listable, Page, SortableColumn};
use crate::models::{Division, DivisionPayload};
use crate::state::AppState;

const LIST_PATH: &str = "/director/divisions";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum DivisionColumn {
    #[default]
    Code,
    Name,
}

impl SortableColumn for DivisionColumn {
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

impl Listable for Division {
    type Column = DivisionColumn;

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || contains(&self.code, needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains(d, needle))
    }

    fn compare(&self, other: &Self, column: DivisionColumn) -> Ordering {
        match column {
            DivisionColumn::Code => self.code.cmp(&other.code),
            DivisionColumn::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/divisions.html")]
pub struct DivisionsTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub page: Page<Division, DivisionColumn>,
}

#[derive(Template)]
#[template(path = "pages/division_form.html")]
pub struct DivisionFormTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub division_id: Option<i64>,
    pub form: DivisionFormData,
    pub errors: FieldErrors,
}

impl DivisionFormTemplate {
    pub fn form_action(&self) -> String {
        match self.division_id {
            Some(id) => format!("{}/{}/update", LIST_PATH, id),
            None => format!("{}/create", LIST_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DivisionFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl DivisionFormData {
    fn from_division(division: &Division) -> Self {
        Self {
            name: division.name.clone(),
            code: division.code.clone(),
            description: division.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<DivisionPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let code = self.code.trim().to_uppercase();

        forms::required(&mut errors, "name", "Name", &self.name);
        forms::max_len(&mut errors, "name", "Name", &self.name, 100);
        forms::required(&mut errors, "code", "Code", &code);
        forms::code(&mut errors, "code", &code);
        forms::max_len(&mut errors, "description", "Description", &self.description, 500);
        errors.into_result()?;

        Ok(DivisionPayload {
            name: self.name.trim().to_string(),
            code,
            description: forms::non_blank(&self.description),
        })
    }
}

fn render_form(
    state: &AppState,
    cookies: &Cookies,
    current: &CurrentUser,
    division_id: Option<i64>,
    form: DivisionFormData,
    errors: FieldErrors,
    toast: Option<Flash>,
) -> AppResult<Html<String>> {
    let mut ctx = PageContext::portal(state, cookies, current, "divisions");
    if let Some(toast) = toast {
        ctx = ctx.with_flash(toast);
    }
    DivisionFormTemplate {
        title: if division_id.is_some() {
            "Edit division".into()
        } else {
            "New division".into()
        },
        ctx,
        division_id,
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
    let division_list = state.cached_divisions(&current.token).await?;

    DivisionsTemplate {
        title: "Divisions".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "divisions"),
        page: listing::build_page(division_list, &params),
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
        DivisionFormData::default(),
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
    let division = divisions::get_division(&state.api, &current.token, id).await?;
    render_form(
        &state,
        &cookies,
        &current,
        Some(id),
        DivisionFormData::from_division(&division),
        FieldErrors::new(),
        None,
    )
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Form(form): Form<DivisionFormData>,
) -> AppResult<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(render_form(&state, &cookies, &current, None, form, errors, None)?
                .into_response())
        }
    };

    match divisions::create_division(&state.api, &current.token, &payload).await {
        Ok(()) => {
            info!(code = %payload.code, "Division created");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Division '{}' created.", payload.name)),
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
    Form(form): Form<DivisionFormData>,
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

    match divisions::update_division(&state.api, &current.token, id, &payload).await {
        Ok(()) => {
            info!(id, "Division updated");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Division '{}' updated.", payload.name)),
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
    match divisions::delete_division(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Division deleted");
            Ok(flash::redirect_with(&cookies, LIST_PATH, Flash::success("Division deleted."))
                .into_response())
        }
        Err(e) => Ok(redirect_failure(&cookies, LIST_PATH, e)?.into_response()),
    }
}
