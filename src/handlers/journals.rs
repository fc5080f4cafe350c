//! Journal batches: list, compose, inspect, post and delete.
//!
//! A batch is entered as a header plus a variable number of line rows. The
//! browser sends the rows as repeated `line_*` fields in document order, so
//! the form is read as raw pairs and regrouped here. Debits and credits are
//! totalled for display only; the backend decides whether a batch balances.

use std::borrow::Borrow;
use std::cmp::Ordering;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use chrono::Local;
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::{debug, info};

use super::{form_failure, redirect_failure, PageContext};
use crate::api::journals::{self, JournalFilter};
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::flash::{self, Flash};
use crate::forms::{self, deserialize_optional_i64, line_key, FieldErrors};
use crate::listing::{self, contains, ListParams, Listable, Page, SortableColumn};
use crate::models::{
    Account, Journal, JournalStatus, JournalType, NewJournal, NewJournalLine, Partner,
};
use crate::state::AppState;

const LIST_PATH: &str = "/finance/journals";
const BLANK_LINES: usize = 4;
const MIN_LINES: usize = 2;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum JournalColumn {
    #[default]
    Date,
    Reference,
    Type,
    Amount,
}

impl SortableColumn for JournalColumn {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "date" => Some(Self::Date),
            "reference" => Some(Self::Reference),
            "type" => Some(Self::Type),
            "amount" => Some(Self::Amount),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Reference => "reference",
            Self::Type => "type",
            Self::Amount => "amount",
        }
    }
}

impl Listable for Journal {
    type Column = JournalColumn;

    fn matches(&self, needle: &str) -> bool {
        contains(&self.reference, needle)
            || self.description.as_deref().is_some_and(|d| contains(d, needle))
            || self
                .journal_type_name
                .as_deref()
                .is_some_and(|t| contains(t, needle))
    }

    fn compare(&self, other: &Self, column: JournalColumn) -> Ordering {
        match column {
            JournalColumn::Date => self
                .date
                .cmp(&other.date)
                .then_with(|| self.id.cmp(&other.id)),
            JournalColumn::Reference => self.reference.cmp(&other.reference),
            JournalColumn::Type => self.journal_type_name.cmp(&other.journal_type_name),
            JournalColumn::Amount => self.debit_total().cmp(&other.debit_total()),
        }
    }
}

/// Status and type filters, read alongside [`ListParams`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalFilterParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub journal_type_id: Option<i64>,
}

impl JournalFilterParams {
    fn status(&self) -> Option<JournalStatus> {
        self.status.as_deref().and_then(JournalStatus::parse)
    }

    fn to_api_filter(&self) -> JournalFilter {
        JournalFilter {
            status: self.status().map(|s| s.as_str().to_string()),
            journal_type_id: self.journal_type_id,
            ..Default::default()
        }
    }
}

#[derive(Template)]
#[template(path = "pages/journals.html")]
pub struct JournalsTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub page: Page<Journal, JournalColumn>,
    pub journal_types: Vec<JournalType>,
    pub status: Option<JournalStatus>,
    pub journal_type_id: Option<i64>,
}

impl JournalsTemplate {
    /// Extra query parameters that keep the active filters on pager and sort links.
    pub fn filter_query(&self) -> String {
        let mut query = String::new();
        if let Some(status) = self.status {
            query.push_str("&status=");
            query.push_str(status.as_str());
        }
        if let Some(id) = self.journal_type_id {
            query.push_str(&format!("&journal_type_id={}", id));
        }
        query
    }

    pub fn status_is(&self, value: &str) -> bool {
        self.status.map(|s| s.as_str()).unwrap_or("") == value
    }

    pub fn type_selected(&self, id: impl Borrow<i64>) -> bool {
        self.journal_type_id == Some(*id.borrow())
    }
}

#[derive(Template)]
#[template(path = "pages/journal_detail.html")]
pub struct JournalDetailTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub journal: Journal,
    pub partners: Vec<Partner>,
}

impl JournalDetailTemplate {
    pub fn partner_name(&self, id: impl Borrow<Option<i64>>) -> String {
        (*id.borrow())
            .and_then(|id| self.partners.iter().find(|p| p.id == id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "-".into())
    }
}

#[derive(Template)]
#[template(path = "pages/journal_form.html")]
pub struct JournalFormTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub form: JournalFormData,
    pub errors: FieldErrors,
    pub journal_types: Vec<JournalType>,
    pub accounts: Vec<Account>,
    pub partners: Vec<Partner>,
}

/// One line row as typed, kept verbatim so a failed submission redisplays it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineInput {
    pub account_id: String,
    pub partner_id: String,
    pub description: String,
    pub debit: String,
    pub credit: String,
}

impl LineInput {
    fn is_blank(&self) -> bool {
        [
            &self.account_id,
            &self.partner_id,
            &self.description,
            &self.debit,
            &self.credit,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }

    pub fn account_selected(&self, id: impl Borrow<i64>) -> bool {
        self.account_id.trim().parse::<i64>().ok() == Some(*id.borrow())
    }

    pub fn partner_selected(&self, id: impl Borrow<i64>) -> bool {
        self.partner_id.trim().parse::<i64>().ok() == Some(*id.borrow())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalFormData {
    pub reference: String,
    pub journal_type_id: String,
    pub date: String,
    pub description: String,
    pub lines: Vec<LineInput>,
}

impl JournalFormData {
    /// Empty batch dated today with a few blank rows.
    pub fn blank(today: &str) -> Self {
        Self {
            date: today.to_string(),
            lines: vec![LineInput::default(); BLANK_LINES],
            ..Default::default()
        }
    }

    /// Regroup submitted pairs. The n-th occurrence of a `line_*` key belongs
    /// to row n.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        let mut seen = [0usize; 5];

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "reference" => {
                    form.reference = value;
                    continue;
                }
                "journal_type_id" => {
                    form.journal_type_id = value;
                    continue;
                }
                "date" => {
                    form.date = value;
                    continue;
                }
                "description" => {
                    form.description = value;
                    continue;
                }
                "line_account_id" => 0,
                "line_partner_id" => 1,
                "line_description" => 2,
                "line_debit" => 3,
                "line_credit" => 4,
                _ => continue,
            };

            let row = seen[slot];
            seen[slot] += 1;
            if form.lines.len() <= row {
                form.lines.resize(row + 1, LineInput::default());
            }
            let line = &mut form.lines[row];
            match slot {
                0 => line.account_id = value,
                1 => line.partner_id = value,
                2 => line.description = value,
                3 => line.debit = value,
                _ => line.credit = value,
            }
        }
        form
    }

    pub fn type_selected(&self, id: impl Borrow<i64>) -> bool {
        self.journal_type_id.trim().parse::<i64>().ok() == Some(*id.borrow())
    }

    /// Sum of the debit column as typed; unparsable cells count as zero.
    pub fn debit_total(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| typed_amount(&l.debit))
            .fold(0, i64::saturating_add)
    }

    pub fn credit_total(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| typed_amount(&l.credit))
            .fold(0, i64::saturating_add)
    }

    pub fn validate(&self) -> Result<NewJournal, FieldErrors> {
        let mut errors = FieldErrors::new();

        forms::required(&mut errors, "reference", "Reference", &self.reference);
        forms::max_len(&mut errors, "reference", "Reference", &self.reference, 50);
        let journal_type_id = self.journal_type_id.trim().parse::<i64>().ok();
        forms::required_id(&mut errors, "journal_type_id", "Journal type", journal_type_id);
        let date = forms::date(&mut errors, "date", &self.date);
        forms::max_len(&mut errors, "description", "Description", &self.description, 500);

        let mut lines = Vec::new();
        for (index, input) in self.lines.iter().enumerate() {
            if input.is_blank() {
                continue;
            }
            if let Some(line) = validate_line(&mut errors, index, input) {
                lines.push(line);
            }
        }
        let filled = self.lines.iter().filter(|l| !l.is_blank()).count();
        if filled < MIN_LINES {
            errors.add(
                "lines",
                format!("A journal needs at least {} lines", MIN_LINES),
            );
        }
        errors.into_result()?;

        Ok(NewJournal {
            reference: self.reference.trim().to_string(),
            journal_type_id: journal_type_id.unwrap_or_default(),
            date: date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            description: forms::non_blank(&self.description),
            lines,
        })
    }
}

fn typed_amount(value: &str) -> i64 {
    let mut scratch = FieldErrors::new();
    forms::amount(&mut scratch, "", value)
}

fn validate_line(
    errors: &mut FieldErrors,
    index: usize,
    input: &LineInput,
) -> Option<NewJournalLine> {
    let before = errors.len();

    let account_id = input.account_id.trim().parse::<i64>().ok();
    if account_id.is_none() {
        errors.add(&line_key(index, "account_id"), "Select an account");
    }
    let debit_key = line_key(index, "debit");
    let debit = forms::amount(errors, &debit_key, &input.debit);
    let credit = forms::amount(errors, &line_key(index, "credit"), &input.credit);
    match (debit > 0, credit > 0) {
        (true, true) => errors.add(&debit_key, "Enter either a debit or a credit, not both"),
        (false, false) if !errors.has(&debit_key) => {
            errors.add(&debit_key, "Enter a debit or a credit amount")
        }
        _ => {}
    }

    if errors.len() != before {
        return None;
    }
    Some(NewJournalLine {
        account_id: account_id.unwrap_or_default(),
        partner_id: input.partner_id.trim().parse::<i64>().ok(),
        description: forms::non_blank(&input.description),
        debit,
        credit,
    })
}

async fn render_form(
    state: &AppState,
    cookies: &Cookies,
    current: &CurrentUser,
    form: JournalFormData,
    errors: FieldErrors,
    toast: Option<Flash>,
) -> AppResult<Html<String>> {
    let (journal_types, accounts, partners) = tokio::try_join!(
        state.cached_journal_types(&current.token),
        state.cached_accounts(&current.token),
        state.cached_partners(&current.token),
    )?;

    let mut ctx = PageContext::portal(state, cookies, current, "journals");
    if let Some(toast) = toast {
        ctx = ctx.with_flash(toast);
    }
    JournalFormTemplate {
        title: "New journal".into(),
        ctx,
        form,
        errors,
        journal_types,
        accounts: accounts.into_iter().filter(|a| a.is_active).collect(),
        partners,
    }
    .render_html()
}

pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Query(mut params): Query<ListParams>,
    Query(filter): Query<JournalFilterParams>,
) -> AppResult<Html<String>> {
    let api_filter = filter.to_api_filter();
    let (mut journal_list, journal_types) = tokio::try_join!(
        journals::list_journals(&state.api, &current.token, &api_filter),
        state.cached_journal_types(&current.token),
    )?;

    // The backend may ignore filters it does not support.
    let status = filter.status();
    journal_list.retain(|j| {
        status.map_or(true, |s| j.status == s)
            && filter
                .journal_type_id
                .map_or(true, |t| j.journal_type_id == t)
    });
    for journal in &mut journal_list {
        if journal.journal_type_name.is_none() {
            journal.journal_type_name = journal_types
                .iter()
                .find(|t| t.id == journal.journal_type_id)
                .map(|t| t.name.clone());
        }
    }
    debug!(count = journal_list.len(), "Journals loaded");

    if params.sort.is_none() {
        params.sort = Some("date".into());
        params.dir = Some("desc".into());
    }

    JournalsTemplate {
        title: "Journals".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "journals"),
        page: listing::build_page(journal_list, &params),
        journal_types,
        status,
        journal_type_id: filter.journal_type_id,
    }
    .render_html()
}

pub async fn new_form(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    render_form(
        &state,
        &cookies,
        &current,
        JournalFormData::blank(&today),
        FieldErrors::new(),
        None,
    )
    .await
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let form = JournalFormData::from_pairs(pairs);
    let journal = match form.validate() {
        Ok(journal) => journal,
        Err(errors) => {
            return Ok(render_form(&state, &cookies, &current, form, errors, None)
                .await?
                .into_response())
        }
    };

    match journals::create_journal(&state.api, &current.token, &journal).await {
        Ok(()) => {
            info!(
                reference = %journal.reference,
                lines = journal.lines.len(),
                "Journal created"
            );
            Ok(flash::redirect_with(
                &cookies,
                LIST_PATH,
                Flash::success(format!("Journal {} saved as draft.", journal.reference)),
            )
            .into_response())
        }
        Err(e) => {
            let (errors, toast) = form_failure(e)?;
            Ok(
                render_form(&state, &cookies, &current, form, errors, Some(toast))
                    .await?
                    .into_response(),
            )
        }
    }
}

pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    let (journal, partners) = tokio::try_join!(
        journals::get_journal(&state.api, &current.token, id),
        state.cached_partners(&current.token),
    )?;

    JournalDetailTemplate {
        title: format!("Journal {}", journal.reference),
        ctx: PageContext::portal(&state, &cookies, &current, "journals"),
        journal,
        partners,
    }
    .render_html()
}

pub async fn post(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let detail_path = format!("{}/{}", LIST_PATH, id);
    match journals::post_journal(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Journal posted");
            Ok(
                flash::redirect_with(&cookies, &detail_path, Flash::success("Journal posted."))
                    .into_response(),
            )
        }
        Err(e) => Ok(redirect_failure(&cookies, &detail_path, e)?.into_response()),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    match journals::delete_journal(&state.api, &current.token, id).await {
        Ok(()) => {
            info!(id, "Journal deleted");
            Ok(flash::redirect_with(&cookies, LIST_PATH, Flash::success("Journal deleted."))
                .into_response())
        }
        Err(e) => {
            let back = format!("{}/{}", LIST_PATH, id);
            Ok(redirect_failure(&cookies, &back, e)?.into_response())
        }
    }
}
