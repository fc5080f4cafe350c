use std::cmp::Ordering;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::info;

use super::{form_failure, redirect_failure, PageContext};
use crate::api::partner_types;
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::flash::{self, Flash};
use crate::forms::{self, FieldErrors};
use crate::listing::{self, contains, ListParams, Listable, Page, SortableColumn};
use crate::models::{PartnerType, PartnerTypePayload};
use crate::state::AppState;

const LIST_PATH: &str = "/director/partner-types";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum PartnerTypeColumn {
    #[default]
    Name,
    Id,
}

impl SortableColumn for PartnerTypeColumn {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
        }
    }
}

impl Listable for PartnerType {
    type Column = PartnerTypeColumn;

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains(d, needle))
    }

    fn compare(&self, other: &Self, column: PartnerTypeColumn) -> Ordering {
        match column {
            PartnerTypeColumn::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
            PartnerTypeColumn::Id => self.id.cmp(&other.id),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/partner_types.html")]
pub struct PartnerTypesTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub page: Page<PartnerType, PartnerTypeColumn>,
}

#[derive(Template)]
#[template(path = "pages/partner_type_form.html")]
pub struct PartnerTypeFormTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub partner_type_id: Option<i64>,
    pub form: PartnerTypeFormData,
    pub errors: FieldErrors,
}

impl PartnerTypeFormTemplate {
    pub fn form_action(&self) -> String {
        match self.partner_type_id {
            Some(id) => format!("{}/{}/update", LIST_PATH, id),
            None => format!("{}/create", LIST_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerTypeFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl PartnerTypeFormData {
    pub fn validate(&self) -> Result<PartnerTypePayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        forms::required(&mut errors, "name", "Name", &self.name);
        forms::max_len(&mut errors, "name", "Name", &self.name, 100);
        forms::max_len(&mut errors, "description", "Description", &self.description, 500);
        errors.into_result()?;

        Ok(PartnerTypePayload {
            name: self.name.trim().to_string(),
            description: forms::non_blank(&self.description),
        })
    }
}

fn render_form(
    state: &AppState,
    cookies: &Cookies,
    current: &CurrentUser,
    partner_type_id: Option<i64>,
    form: PartnerTypeFormData,
    errors: FieldErrors,
    toast: Option<Flash>,
) -> AppResult<Html<String>> {
    let mut ctx = PageContext::portal(state, cookies, current, "partner-types");
    if let Some(toast) = toast {
        ctx = ctx.with_flash(toast);
    }
    PartnerTypeFormTemplate {
        title: match partner_type_id {
            Some(_) => "Edit partner type".into(),
            None => "New partner type".into(),
        },
        ctx,
        partner_type_id,
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
    let types = state.cached_partner_types(&current.token).await?;

    PartnerTypesTemplate {
        title: "Partner types".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "partner-types"),
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
        PartnerTypeFormData::default(),
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
    let partner_type = partner_types::get_partner_type(&state.api, &current.token, id).await?;
    let form = PartnerTypeFormData {
        name: partner_type.name,
        description: partner_type.description.unwrap_or_default(),
    };
    render_form(&state, &cookies, &current, Some(id), form, FieldErrors::new(), None)
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Form(form): Form<PartnerTypeFormData>,
) -> AppResult<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(render_form(&state, &cookies, &current, None, form, errors, None)?
                .into_response())
        }
    };

    match partner_types::create_partner_type(&state.api, &current.token, &payload).await {
        Ok(()) => {
            info!(name = %payload.name, "Partner type created");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Partner type '{}' created.", payload.name)),
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
    Form(form): Form<PartnerTypeFormData>,
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

    match partner_types::update_partner_type(&state.api, &current.token, id, &payload).await {
        Ok(()) => {
            info!(id, "Partner type updated");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Partner type '{}' updated.", payload.name)),
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
    match partner_types::delete_partner_type(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Partner type deleted");
            Ok(
                flash::redirect_with(&cookies, LIST_PATH, Flash::success("Partner type deleted."))
                    .into_response(),
            )
        }
        Err(e) => Ok(redirect_failure(&cookies, LIST_PATH, e)?.into_response()),
    }
}
