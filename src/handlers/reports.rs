//! Read-only financial reports with period filters and CSV export.

use std::borrow::Borrow;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::{info, warn};

use super::PageContext;
use crate::api::reports::{self, ReportQuery};
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult, RenderHtml};
use crate::forms::deserialize_optional_i64;
use crate::models::{Division, Report, ReportKind};
use crate::periods::{self, DateRange, PeriodPreset};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportParams {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// `prev` or `next` to step the period.
    #[serde(default)]
    pub nav: Option<String>,
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub division_id: Option<i64>,
}

/// The period a report covers once the query parameters are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    Range(DateRange),
    AsOf(NaiveDate),
}

impl ReportParams {
    pub fn resolve(&self, kind: ReportKind, today: NaiveDate) -> Period {
        if !kind.is_range() {
            let as_of = self
                .as_of
                .as_deref()
                .and_then(periods::parse_date)
                .unwrap_or(today);
            return Period::AsOf(as_of);
        }

        let from = self.from.as_deref().and_then(periods::parse_date);
        let to = self.to.as_deref().and_then(periods::parse_date);
        let range = match (from, to) {
            (Some(from), Some(to)) => DateRange::from_dates(from, to, today),
            _ => {
                let preset = self
                    .preset
                    .as_deref()
                    .and_then(|p| p.parse::<PeriodPreset>().ok())
                    .unwrap_or(PeriodPreset::ThisMonth);
                DateRange::from_preset_at(preset, today)
            }
        };
        let range = match self.nav.as_deref() {
            Some("prev") => range.prev(today),
            Some("next") => range.next(today),
            _ => range,
        };
        Period::Range(range)
    }
}

fn report_query(period: &Period, division_id: Option<i64>) -> ReportQuery {
    match period {
        Period::Range(range) => ReportQuery {
            from: Some(range.from_iso()),
            to: Some(range.to_iso()),
            division_id,
            ..Default::default()
        },
        Period::AsOf(date) => ReportQuery {
            as_of: Some(date.format("%Y-%m-%d").to_string()),
            division_id,
            ..Default::default()
        },
    }
}

fn period_query(period: &Period, division_id: Option<i64>) -> String {
    let mut query = match period {
        Period::Range(range) => range.query_string(),
        Period::AsOf(date) => format!("as_of={}", date.format("%Y-%m-%d")),
    };
    if let Some(id) = division_id {
        query.push_str(&format!("&division_id={}", id));
    }
    query
}

fn kind_from_path(slug: &str) -> AppResult<ReportKind> {
    ReportKind::from_slug(slug)
        .ok_or_else(|| AppError::NotFound(format!("No report named '{}'", slug)))
}

#[derive(Template)]
#[template(path = "pages/reports.html")]
pub struct ReportsIndexTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub reports: &'static [ReportKind],
}

#[derive(Template)]
#[template(path = "pages/report.html")]
pub struct ReportTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub kind: ReportKind,
    pub report: Report,
    pub period: Period,
    pub presets: &'static [PeriodPreset],
    pub divisions: Vec<Division>,
    pub division_id: Option<i64>,
}

impl ReportTemplate {
    pub fn period_label(&self) -> String {
        match &self.period {
            Period::Range(range) => range.display_label(),
            Period::AsOf(date) => format!("As of {}", date.format("%B %-d, %Y")),
        }
    }

    pub fn range(&self) -> Option<&DateRange> {
        match &self.period {
            Period::Range(range) => Some(range),
            Period::AsOf(_) => None,
        }
    }

    pub fn as_of(&self) -> String {
        match &self.period {
            Period::AsOf(date) => date.format("%Y-%m-%d").to_string(),
            Period::Range(range) => range.to_iso(),
        }
    }

    /// Query string for the same report with the period stepped by `nav`.
    pub fn nav_query(&self, nav: &str) -> String {
        format!("{}&nav={}", period_query(&self.period, self.division_id), nav)
    }

    pub fn preset_query(&self, preset: &PeriodPreset) -> String {
        let mut query = format!("preset={}", preset.as_str());
        if let Some(id) = self.division_id {
            query.push_str(&format!("&division_id={}", id));
        }
        query
    }

    pub fn export_query(&self) -> String {
        period_query(&self.period, self.division_id)
    }

    pub fn division_selected(&self, id: impl Borrow<i64>) -> bool {
        self.division_id == Some(*id.borrow())
    }
}

pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    ReportsIndexTemplate {
        title: "Reports".into(),
        ctx: PageContext::portal(&state, &cookies, &current, "reports"),
        reports: ReportKind::all(),
    }
    .render_html()
}

pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    cookies: Cookies,
    Path(slug): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<Html<String>> {
    let kind = kind_from_path(&slug)?;
    let period = params.resolve(kind, Local::now().date_naive());
    let query = report_query(&period, params.division_id);

    let (report, divisions) = tokio::join!(
        reports::fetch_report(&state.api, &current.token, kind, &query),
        state.cached_divisions(&current.token),
    );
    let report = report?;
    // The division filter is optional; a failed lookup only hides it.
    let divisions = match divisions {
        Ok(divisions) => divisions,
        Err(AppError::Unauthorized) => return Err(AppError::Unauthorized),
        Err(e) => {
            warn!(error = %e, "Division list unavailable for report filter");
            Vec::new()
        }
    };

    ReportTemplate {
        title: kind.title().to_string(),
        ctx: PageContext::portal(&state, &cookies, &current, "reports"),
        kind,
        report,
        period,
        presets: PeriodPreset::all(),
        divisions,
        division_id: params.division_id,
    }
    .render_html()
}

/// Serialize a report as CSV, headers first.
pub fn report_csv(report: &Report) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(report.csv_headers())?;
    for row in report.csv_rows() {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to finish CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV is not UTF-8: {}", e)))
}

fn export_filename(kind: ReportKind, period: &Period) -> String {
    match period {
        Period::Range(range) => format!(
            "{}_{}_{}.csv",
            kind.slug(),
            range.from_iso(),
            range.to_iso()
        ),
        Period::AsOf(date) => format!("{}_{}.csv", kind.slug(), date.format("%Y-%m-%d")),
    }
}

pub async fn export(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(slug): Path<String>,
    Query(params): Query<ReportParams>,
) -> AppResult<impl IntoResponse> {
    let kind = kind_from_path(&slug)?;
    let period = params.resolve(kind, Local::now().date_naive());
    let query = report_query(&period, params.division_id);

    let report = reports::fetch_report(&state.api, &current.token, kind, &query).await?;
    let body = report_csv(&report)?;
    let filename = export_filename(kind, &period);
    info!(report = kind.slug(), user = %current.user.email, "Report exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
