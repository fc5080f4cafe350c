//! Public marketing pages.

use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tower_cookies::Cookies;

use super::PageContext;
use crate::auth::CurrentUser;
use crate::error::{AppResult, RenderHtml};
use crate::state::AppState;

pub struct Offering {
    pub title: &'static str,
    pub summary: &'static str,
}

const OFFERINGS: &[Offering] = &[
    Offering {
        title: "Savings & Deposits",
        summary: "Regular and fixed deposit accounts with competitive dividends paid to members every year.",
    },
    Offering {
        title: "Development Loans",
        summary: "Loans of up to three times your deposits for building, farming and business growth.",
    },
    Offering {
        title: "Emergency Loans",
        summary: "Quick-disbursement credit for school fees, medical bills and other urgent needs.",
    },
    Offering {
        title: "Asset Financing",
        summary: "Flexible financing for vehicles, equipment and land, secured against the asset.",
    },
];

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub offerings: &'static [Offering],
}

#[derive(Template)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub title: String,
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "pages/services.html")]
pub struct ServicesTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub offerings: &'static [Offering],
}

#[derive(Template)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub title: String,
    pub ctx: PageContext,
}

pub async fn home(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    HomeTemplate {
        title: "Home".into(),
        ctx: PageContext::new(&state, &cookies, current.as_ref(), "home"),
        offerings: OFFERINGS,
    }
    .render_html()
}

pub async fn about(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    AboutTemplate {
        title: "About us".into(),
        ctx: PageContext::new(&state, &cookies, current.as_ref(), "about"),
    }
    .render_html()
}

pub async fn services(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    ServicesTemplate {
        title: "Services".into(),
        ctx: PageContext::new(&state, &cookies, current.as_ref(), "services"),
        offerings: OFFERINGS,
    }
    .render_html()
}

pub async fn contact(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    ContactTemplate {
        title: "Contact".into(),
        ctx: PageContext::new(&state, &cookies, current.as_ref(), "contact"),
    }
    .render_html()
}
