//! Full-page rendering of error responses.
//!
//! Handlers return bare status codes (plus an [`ErrorMessage`] extension);
//! this layer wraps them in the site layout. A signed-in user keeps the
//! portal sidebar so a 403 or 404 inside the portal is not a dead end.

use askama::Template;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use tower_cookies::Cookies;

use crate::auth::{CurrentUser, SESSION_COOKIE};
use crate::handlers::PageContext;
use crate::state::AppState;

/// Newtype for passing error messages through response extensions.
#[derive(Clone)]
pub struct ErrorMessage(pub String);

#[derive(Template)]
#[template(path = "pages/error.html")]
pub struct ErrorPageTemplate {
    pub title: String,
    pub ctx: PageContext,
    pub status_code: u16,
    pub status_text: &'static str,
    pub message: String,
}

impl ErrorPageTemplate {
    pub fn back_href(&self) -> &'static str {
        if self.ctx.signed_in() {
            self.ctx.home_path()
        } else {
            "/"
        }
    }

    pub fn back_label(&self) -> &'static str {
        if self.ctx.signed_in() {
            "Back to dashboard"
        } else {
            "Back to home"
        }
    }
}

/// Replace 4xx/5xx responses with a rendered error page. HTMX requests and
/// the health check keep their original bodies.
pub async fn error_page_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request<Body>,
    next: Next,
) -> Response {
    let passthrough =
        request.headers().contains_key("hx-request") || request.uri().path() == "/health";
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = response
        .extensions()
        .get::<ErrorMessage>()
        .map(|e| e.0.clone());
    tracing::warn!(
        %status,
        %method,
        %path,
        message = message.as_deref().unwrap_or(""),
        "request failed"
    );

    if passthrough {
        return response;
    }

    // Looked up after the handler ran, so a session ended by this request
    // is already gone.
    let current = cookies.get(SESSION_COOKIE).and_then(|c| {
        state
            .sessions
            .get(c.value())
            .map(|s| CurrentUser::from_session(c.value(), s))
    });
    let ctx = PageContext::new(&state, &cookies, current.as_ref(), "error");

    render(ctx, status, message.unwrap_or_else(|| default_message(status)))
}

/// Fallback handler for unmatched routes.
pub async fn fallback_handler() -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    response.extensions_mut().insert(ErrorMessage(
        "The page you're looking for doesn't exist.".into(),
    ));
    response
}

fn render(ctx: PageContext, status: StatusCode, message: String) -> Response {
    let status_text = status_title(status);
    let template = ErrorPageTemplate {
        title: status_text.to_string(),
        ctx,
        status_code: status.as_u16(),
        status_text,
        message,
    };

    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page template: {}", e);
            (status, status_text).into_response()
        }
    }
}

fn status_title(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad Request",
        StatusCode::UNAUTHORIZED => "Sign In Required",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::NOT_FOUND => "Not Found",
        StatusCode::METHOD_NOT_ALLOWED => "Method Not Allowed",
        StatusCode::CONFLICT => "Conflict",
        StatusCode::BAD_GATEWAY => "Service Unavailable",
        s if s.is_server_error() => "Server Error",
        _ => "Error",
    }
}

fn default_message(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "Please sign in to continue.".into(),
        StatusCode::FORBIDDEN => "You don't have permission to access this.".into(),
        StatusCode::NOT_FOUND => "The page you're looking for doesn't exist.".into(),
        StatusCode::METHOD_NOT_ALLOWED => "This action is not supported.".into(),
        StatusCode::BAD_GATEWAY => "The accounting service is not responding.".into(),
        s if s.is_server_error() => "Something went wrong on our end.".into(),
        s => format!("An unexpected error occurred ({}).", s.as_u16()),
    }
}
