pub mod accounts;
pub mod coa;
pub mod dashboard;
pub mod divisions;
pub mod journal_types;
pub mod journals;
pub mod partner_types;
pub mod partners;
pub mod reports;
pub mod site;

use axum::middleware;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;
use tower_cookies::Cookies;
use tracing::warn;

use crate::auth::{self, CurrentUser};
use crate::error::{AppError, AppResult};
use crate::filters::MoneyFormat;
use crate::flash::{self, Flash};
use crate::forms::FieldErrors;
use crate::models::{Role, User};
use crate::state::{AppState, JsManifest};
use crate::VERSION;

const SITE_NAV: &[&str] = &["", "home", "about", "services", "contact", "login"];

/// Values every page layout needs.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub org_name: String,
    pub version: &'static str,
    pub manifest: JsManifest,
    pub xsrf_token: String,
    pub user: Option<User>,
    pub role: Option<Role>,
    pub flash: Option<Flash>,
    pub money: MoneyFormat,
    /// Key of the active navigation entry.
    pub nav: &'static str,
}

impl PageContext {
    pub fn new(
        state: &AppState,
        cookies: &Cookies,
        current: Option<&CurrentUser>,
        nav: &'static str,
    ) -> Self {
        Self {
            org_name: state.config.org_name.clone(),
            version: VERSION,
            manifest: state.manifest.clone(),
            xsrf_token: current
                .map(|c| c.xsrf_token.clone())
                .unwrap_or_else(|| state.xsrf_token.value().to_string()),
            user: current.map(|c| c.user.clone()),
            role: current.map(|c| c.role),
            flash: flash::take_flash(cookies),
            money: state.money(),
            nav,
        }
    }

    pub fn public(state: &AppState, cookies: &Cookies, nav: &'static str) -> Self {
        Self::new(state, cookies, None, nav)
    }

    pub fn portal(
        state: &AppState,
        cookies: &Cookies,
        current: &CurrentUser,
        nav: &'static str,
    ) -> Self {
        Self::new(state, cookies, Some(current), nav)
    }

    pub fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_director(&self) -> bool {
        self.role == Some(Role::Director)
    }

    pub fn is_finance(&self) -> bool {
        self.role == Some(Role::Finance)
    }

    pub fn nav_is(&self, key: &str) -> bool {
        self.nav == key
    }

    /// Portal pages get the sidebar layout; marketing pages keep the site layout
    /// even for a signed-in visitor.
    pub fn in_portal(&self) -> bool {
        self.signed_in() && !SITE_NAV.contains(&self.nav)
    }

    pub fn home_path(&self) -> &'static str {
        self.role.map(|r| r.home_path()).unwrap_or("/login")
    }

    pub fn role_label(&self) -> &'static str {
        self.role.map(|r| r.label()).unwrap_or("")
    }

    pub fn user_name(&self) -> String {
        self.user.as_ref().map(|u| u.name.clone()).unwrap_or_default()
    }

    pub fn user_initials(&self) -> String {
        self.user.as_ref().map(|u| u.initials()).unwrap_or_default()
    }

    /// Show a toast on a page rendered directly (no redirect).
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }
}

/// Turn a failed backend mutation into inline form errors plus an error
/// toast. Session expiry is passed through so the user is signed out.
pub fn form_failure(err: AppError) -> AppResult<(FieldErrors, Flash)> {
    if matches!(err, AppError::Unauthorized) {
        return Err(err);
    }
    warn!(error = %err, "Backend rejected form submission");
    let fields = err.field_errors().cloned().unwrap_or_default();
    Ok((fields, Flash::error(err.user_message())))
}

/// Redirect back with an error toast after a failed action (delete, post).
pub fn redirect_failure(cookies: &Cookies, to: &str, err: AppError) -> AppResult<Redirect> {
    if matches!(err, AppError::Unauthorized) {
        return Err(err);
    }
    warn!(error = %err, "Backend rejected action");
    Ok(flash::redirect_with(cookies, to, Flash::error(err.user_message())))
}

pub fn routes() -> Router<AppState> {
    let director = Router::new()
        .route("/director", get(dashboard::director))
        // Divisions
        .route("/director/divisions", get(divisions::index))
        .route("/director/divisions/new", get(divisions::new_form))
        .route("/director/divisions/create", post(divisions::create))
        .route("/director/divisions/:id/edit", get(divisions::edit_form))
        .route("/director/divisions/:id/update", post(divisions::update))
        .route("/director/divisions/:id/delete", post(divisions::delete))
        // Partner types
        .route("/director/partner-types", get(partner_types::index))
        .route("/director/partner-types/new", get(partner_types::new_form))
        .route("/director/partner-types/create", post(partner_types::create))
        .route(
            "/director/partner-types/:id/edit",
            get(partner_types::edit_form),
        )
        .route(
            "/director/partner-types/:id/update",
            post(partner_types::update),
        )
        .route(
            "/director/partner-types/:id/delete",
            post(partner_types::delete),
        )
        // Partners
        .route("/director/partners", get(partners::index))
        .route("/director/partners/new", get(partners::new_form))
        .route("/director/partners/create", post(partners::create))
        .route("/director/partners/:id/edit", get(partners::edit_form))
        .route("/director/partners/:id/update", post(partners::update))
        .route("/director/partners/:id/delete", post(partners::delete))
        .route_layer(middleware::from_fn(auth::require_director));

    let finance = Router::new()
        .route("/finance", get(dashboard::finance))
        // Chart of accounts
        .route("/finance/coa", get(coa::index))
        .route("/finance/coa/new", get(coa::new_form))
        .route("/finance/coa/create", post(coa::create))
        .route("/finance/coa/:id/edit", get(coa::edit_form))
        .route("/finance/coa/:id/update", post(coa::update))
        .route("/finance/coa/:id/delete", post(coa::delete))
        // Accounts
        .route("/finance/accounts", get(accounts::index))
        .route("/finance/accounts/new", get(accounts::new_form))
        .route("/finance/accounts/create", post(accounts::create))
        .route("/finance/accounts/:id/edit", get(accounts::edit_form))
        .route("/finance/accounts/:id/update", post(accounts::update))
        .route("/finance/accounts/:id/delete", post(accounts::delete))
        // Journal types
        .route("/finance/journal-types", get(journal_types::index))
        .route("/finance/journal-types/new", get(journal_types::new_form))
        .route("/finance/journal-types/create", post(journal_types::create))
        .route(
            "/finance/journal-types/:id/edit",
            get(journal_types::edit_form),
        )
        .route(
            "/finance/journal-types/:id/update",
            post(journal_types::update),
        )
        .route(
            "/finance/journal-types/:id/delete",
            post(journal_types::delete),
        )
        // Journal batches
        .route("/finance/journals", get(journals::index))
        .route("/finance/journals/new", get(journals::new_form))
        .route("/finance/journals/create", post(journals::create))
        .route("/finance/journals/:id", get(journals::show))
        .route("/finance/journals/:id/post", post(journals::post))
        .route("/finance/journals/:id/delete", post(journals::delete))
        .route_layer(middleware::from_fn(auth::require_finance));

    let reports = Router::new()
        .route("/reports", get(reports::index))
        .route("/reports/:kind", get(reports::show))
        .route("/reports/:kind/export", get(reports::export))
        .route_layer(middleware::from_fn(auth::require_any_role));

    Router::new()
        // Marketing site
        .route("/", get(site::home))
        .route("/about", get(site::about))
        .route("/services", get(site::services))
        .route("/contact", get(site::contact))
        // Sign in / out
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .merge(director)
        .merge(finance)
        .merge(reports)
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
