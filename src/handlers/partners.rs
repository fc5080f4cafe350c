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
use crate::api::partners;
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::flash::{self, Flash};
use crate::forms::{self, deserialize_optional_i64, FieldErrors};
use crate::listing::{self, contains, ListParams, Listable, Page, SortableColumn};
use crate::models::{Division, Partner, PartnerPayload, PartnerType};
use crate::state::AppState;

const LIST_PATH: &str = "/director/partners";

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum PartnerColumn {
    #[default]
    Name,
    Type,
    Email,
}

impl SortableColumn for PartnerColumn {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "type" => Some(Self::Type),
            "email" => Some(Self::Email),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::Email => "email",
        }
    }
}

impl Listable for Partner {
    type Column = PartnerColumn;

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || [&self.partner_type_name, &self.email, &self.phone]
                .into_iter()
                .flatten()
                .any(|v| contains(v, needle))
    }

    fn compare(&self, other: &Self, column: PartnerColumn) -> Ordering {
        match column {
            PartnerColumn::Name => self.name.to_lowercase().cmp(&other.name.to_lowercase()),
            PartnerColumn::Type => self.partner_type_name.cmp(&other.partner_type_name),
            PartnerColumn::Email => self.email.cmp(&other.email),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/partners.html")]
pub struct PartnersTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub page: Page<Partner, PartnerColumn>,
    pub divisions: Vec<Division>,
}

impl PartnersTemplate {
    pub fn division_name(&self, id: impl Borrow<Option<i64>>) -> String {
        division_label(&self.divisions, *id.borrow())
    }
}

fn division_label(divisions: &[Division], id: Option<i64>) -> String {
    id.and_then(|id| divisions.iter().find(|d| d.id == id))
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "-".into())
}

#[derive(Template)]
#[template(path = "pages/partner_form.html")]
pub struct PartnerFormTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub partner_id: Option<i64>,
    pub form: PartnerFormData,
    pub errors: FieldErrors,
    pub partner_types: Vec<PartnerType>,
    pub divisions: Vec<Division>,
}

impl PartnerFormTemplate {
    pub fn form_action(&self) -> String {
        match self.partner_id {
            Some(id) => format!("{}/{}/update", LIST_PATH, id),
            None => format!("{}/create", LIST_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub partner_type_id: Option<i64>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub division_id: Option<i64>,
}

impl PartnerFormData {
    fn from_partner(partner: &Partner) -> Self {
        Self {
            name: partner.name.clone(),
            partner_type_id: Some(partner.partner_type_id),
            email: partner.email.clone().unwrap_or_default(),
            phone: partner.phone.clone().unwrap_or_default(),
            division_id: partner.division_id,
        }
    }

    pub fn type_selected(&self, id: impl Borrow<i64>) -> bool {
        self.partner_type_id == Some(*id.borrow())
    }

    pub fn division_selected(&self, id: impl Borrow<i64>) -> bool {
        self.division_id == Some(*id.borrow())
    }

    pub fn validate(&self) -> Result<PartnerPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = forms::non_blank(&self.email);
        let phone = forms::non_blank(&self.phone);

        forms::required(&mut errors, "name", "Name", &self.name);
        forms::max_len(&mut errors, "name", "Name", &self.name, 150);
        forms::required_id(&mut errors, "partner_type_id", "Partner type", self.partner_type_id);
        forms::email(&mut errors, "email", email.as_deref());
        forms::phone(&mut errors, "phone", phone.as_deref());
        errors.into_result()?;

        Ok(PartnerPayload {
            name: self.name.trim().to_string(),
            partner_type_id: self.partner_type_id.unwrap_or_default(),
            email,
            phone,
            division_id: self.division_id,
        })
    }
}

async fn render_form(
    state: &AppState,
    cookies: &Cookies,
    current: &CurrentUser,
    partner_id: Option<i64>,
    form: PartnerFormData,
    errors: FieldErrors,
    toast: Option<Flash>,
) -> AppResult<Html<String>> {
    let (partner_types, divisions) = tokio::try_join!(
        state.cached_partner_types(&current.token),
        state.cached_divisions(&current.token),
    )?;

    let mut ctx = PageContext::portal(state, cookies, current, "partners");
    if let Some(toast) = toast {
        ctx = ctx.with_flash(toast);
    }
    PartnerFormTemplate {
        title: match partner_id {
            Some(_) => "Edit partner".into(),
            None => "New partner".into(),
        },
        ctx,
        partner_id,
        form,
        errors,
        partner_types,
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
    let (mut partner_list, types, divisions) = tokio::try_join!(
        state.cached_partners(&current.token),
        state.cached_partner_types(&current.token),
        state.cached_divisions(&current.token),
    )?;

    // Resolve type names first so search and sort see them.
    for partner in &mut partner_list {
        partner.partner_type_name = Some(partner.type_label(&types));
    }

    PartnersTemplate {
        title: "Partners".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "partners"),
        page: listing::build_page(partner_list, &params),
        divisions,
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
        PartnerFormData::default(),
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
    let partner = partners::get_partner(&state.api, &current.token, id).await?;
    render_form(
        &state,
        &cookies,
        &current,
        Some(id),
        PartnerFormData::from_partner(&partner),
        FieldErrors::new(),
        None,
    )
    .await
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Form(form): Form<PartnerFormData>,
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

    match partners::create_partner(&state.api, &current.token, &payload).await {
        Ok(()) => {
            info!(name = %payload.name, "Partner created");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Partner '{}' created.", payload.name)),
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
    Form(form): Form<PartnerFormData>,
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

    match partners::update_partner(&state.api, &current.token, id, &payload).await {
        Ok(()) => {
            info!(id, "Partner updated");
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Partner '{}' updated.", payload.name)),
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
    match partners::delete_partner(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Partner deleted");
            Ok(flash::redirect_with(&cookies, LIST_PATH, Flash::success("Partner deleted."))
                .into_response())
        }
        Err(e) => Ok(redirect_failure(&cookies, LIST_PATH, e)?.into_response()),
    }
}
