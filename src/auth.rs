//! Authentication middleware, role guards and the login/logout handlers.
//!
//! Credentials are checked by the backend, which hands back a bearer token
//! and the user's role. The token never reaches the browser: it is kept in a
//! server-side session store keyed by a random session id, and the id is
//! what goes into the cookie.

use std::time::Instant;

use askama::Template;
use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api;
use crate::error::{AppError, AppResult, RenderHtml, SessionExpired};
use crate::flash::{self, Flash};
use crate::forms::{self, FieldErrors};
use crate::handlers::PageContext;
use crate::models::{Role, User};
use crate::state::{AppState, Session};

/// Cookie name for the session id.
pub const SESSION_COOKIE: &str = "session";

/// Path prefixes that require a signed-in user.
const PROTECTED_PREFIXES: &[&str] = &["/director", "/finance", "/reports"];

/// The signed-in user for the current request.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub session_id: String,
    pub token: String,
    pub user: User,
    pub role: Role,
    pub xsrf_token: String,
}

impl CurrentUser {
    pub(crate) fn from_session(session_id: &str, session: Session) -> Self {
        Self {
            session_id: session_id.to_string(),
            token: session.token,
            user: session.user,
            role: session.role,
            xsrf_token: session.xsrf_token,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub email: String,
    pub errors: FieldErrors,
}

/// Form data for login.
#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginFormData {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        forms::required(&mut errors, "email", "Email", &self.email);
        forms::required(&mut errors, "password", "Password", &self.password);
        if !self.email.trim().is_empty() {
            forms::email(&mut errors, "email", Some(self.email.trim()));
        }
        errors.into_result()
    }
}

pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{}/", p)))
}

fn clear_session_cookie(cookies: &Cookies) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookies.remove(cookie);
}

/// Authentication middleware.
///
/// Attaches [`CurrentUser`] to requests that carry a live session, sends
/// anonymous visitors of portal paths to the login page, and ends the local
/// session when a handler reports that the backend rejected the token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let is_htmx = request.headers().contains_key("HX-Request");

    let session_id = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let current = session_id.as_deref().and_then(|id| {
        state
            .sessions
            .touch(id, state.config.session_idle_timeout)
            .map(|s| CurrentUser::from_session(id, s))
    });

    let Some(current) = current else {
        if session_id.is_some() {
            clear_session_cookie(&cookies);
        }
        if !is_protected(&path) {
            return next.run(request).await;
        }
        if is_htmx {
            return (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
        }
        flash::set_flash(&cookies, &Flash::info("Please sign in to continue."));
        return Redirect::to("/login").into_response();
    };

    let session_id = current.session_id.clone();
    request.extensions_mut().insert(current);
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        info!(%path, "Backend rejected session token, signing out");
        state.sessions.remove(&session_id);
        clear_session_cookie(&cookies);
        if is_htmx {
            return response;
        }
        flash::set_flash(
            &cookies,
            &Flash::info("Your session has expired. Please sign in again."),
        );
        return Redirect::to("/login").into_response();
    }

    response
}

async fn require_role(allowed: &[Role], request: Request<Body>, next: Next) -> Response {
    let role = request.extensions().get::<CurrentUser>().map(|c| c.role);
    match role {
        Some(role) if allowed.contains(&role) => next.run(request).await,
        Some(role) => {
            warn!(role = role.as_str(), path = %request.uri().path(), "Role not allowed");
            AppError::Forbidden(format!(
                "This area is not available to {} users.",
                role.label()
            ))
            .into_response()
        }
        None => AppError::Unauthorized.into_response(),
    }
}

pub async fn require_director(request: Request<Body>, next: Next) -> Response {
    require_role(&[Role::Director], request, next).await
}

pub async fn require_finance(request: Request<Body>, next: Next) -> Response {
    require_role(&[Role::Finance], request, next).await
}

pub async fn require_any_role(request: Request<Body>, next: Next) -> Response {
    require_role(&[Role::Director, Role::Finance], request, next).await
}

fn login_form(
    state: &AppState,
    cookies: &Cookies,
    email: String,
    errors: FieldErrors,
    flash: Option<Flash>,
) -> AppResult<Html<String>> {
    let mut ctx = PageContext::public(state, cookies, "login");
    if flash.is_some() {
        ctx.flash = flash;
    }
    LoginTemplate {
        title: "Sign in".into(),
        ctx,
        email,
        errors,
    }
    .render_html()
}

/// Render the login page.
pub async fn login_page(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    cookies: Cookies,
) -> AppResult<Response> {
    if let Some(current) = current {
        return Ok(Redirect::to(current.role.home_path()).into_response());
    }
    Ok(login_form(&state, &cookies, String::new(), FieldErrors::new(), None)?.into_response())
}

/// Handle login form submission.
pub async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginFormData>,
) -> AppResult<Response> {
    let email = form.email.trim().to_string();
    if let Err(errors) = form.validate() {
        return Ok(login_form(&state, &cookies, email, errors, None)?.into_response());
    }

    let login = match api::auth::login(&state.api, &email, &form.password).await {
        Ok(login) => login,
        Err(e) => {
            let message = match &e {
                AppError::Unauthorized => "Invalid email or password.".to_string(),
                other => other.user_message(),
            };
            warn!(%email, error = %e, "Login failed");
            return Ok(login_form(
                &state,
                &cookies,
                email,
                e.field_errors().cloned().unwrap_or_default(),
                Some(Flash::error(message)),
            )?
            .into_response());
        }
    };

    let Some(role) = login.user.role() else {
        warn!(%email, role = %login.user.role, "User has no portal role");
        return Ok(login_form(
            &state,
            &cookies,
            email,
            FieldErrors::new(),
            Some(Flash::error("Your account does not have access to the portal.")),
        )?
        .into_response());
    };

    let session_id = Uuid::new_v4().to_string();
    let name = login.user.name.clone();
    state.sessions.insert(
        session_id.clone(),
        Session {
            token: login.token,
            user: login.user,
            role,
            xsrf_token: Uuid::new_v4().to_string(),
            last_seen: Instant::now(),
        },
    );
    info!(%email, role = role.as_str(), "User signed in");

    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(tower_cookies::cookie::SameSite::Strict)
        .build();
    cookies.add(cookie);

    Ok(flash::redirect_with(
        &cookies,
        role.home_path(),
        Flash::success(format!("Welcome back, {}.", name)),
    )
    .into_response())
}

/// Handle logout.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        if let Some(session) = state.sessions.remove(session_cookie.value()) {
            if let Err(e) = api::auth::logout(&state.api, &session.token).await {
                warn!(error = %e, "Backend logout failed; local session removed anyway");
            }
        }
    }

    clear_session_cookie(&cookies);
    flash::redirect_with(&cookies, "/login", Flash::success("You have been signed out."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_paths() {
        assert!(is_protected("/director"));
        assert!(is_protected("/finance/journals/3"));
        assert!(is_protected("/reports/balance-sheet"));
        assert!(!is_protected("/"));
        assert!(!is_protected("/about"));
        assert!(!is_protected("/directory"));
        assert!(!is_protected("/login"));
    }

    #[test]
    fn test_login_validation() {
        let form = LoginFormData {
            email: "".into(),
            password: "".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("password"));

        let form = LoginFormData {
            email: "director@umoja.co.ke".into(),
            password: "secret".into(),
        };
        assert!(form.validate().is_ok());
    }
}
