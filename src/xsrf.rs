//! XSRF (Cross-Site Request Forgery) protection middleware and utilities.
//!
//! Signed-in users get a token per session; forms rendered before sign-in
//! (the login form) use a process-wide token. State-changing requests
//! (POST, PUT, DELETE, PATCH) must echo the expected token back.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::auth::SESSION_COOKIE;
use crate::state::AppState;

/// The header name for XSRF tokens in AJAX/HTMX requests.
pub const XSRF_HEADER: &str = "X-XSRF-Token";

/// The form field name for XSRF tokens in form submissions.
pub const XSRF_FORM_FIELD: &str = "_xsrf_token";

/// Largest form body inspected for a token.
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// XSRF token storage that can be shared across the application.
#[derive(Clone, Debug)]
pub struct XsrfToken(Arc<String>);

impl XsrfToken {
    /// Generate a new random XSRF token.
    pub fn generate() -> Self {
        Self(Arc::new(Uuid::new_v4().to_string()))
    }

    /// Get the token value as a string.
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Token the current request must carry: the session's when signed in,
/// otherwise the process-wide one.
fn expected_token(state: &AppState, cookies: &Cookies) -> String {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|c| state.sessions.get(c.value()))
        .map(|s| s.xsrf_token)
        .unwrap_or_else(|| state.xsrf_token.value().to_string())
}

/// Middleware that validates XSRF tokens on state-changing requests.
pub async fn xsrf_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    ) {
        return next.run(request).await;
    }

    let expected = expected_token(&state, &cookies);

    // Check for token in header first (for HTMX/AJAX requests)
    let header_token = request
        .headers()
        .get(XSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if let Some(token) = header_token {
        if token == expected {
            return next.run(request).await;
        }
        return xsrf_error_response();
    }

    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);

    // Anything other than a urlencoded form must use the header
    if !is_form {
        return xsrf_error_response();
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
        Ok(b) => b,
        Err(_) => return xsrf_error_response(),
    };

    let form_token = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
        .ok()
        .and_then(|pairs| {
            pairs
                .into_iter()
                .find(|(key, _)| key == XSRF_FORM_FIELD)
                .map(|(_, value)| value)
        });

    match form_token {
        Some(token) if token == expected => {
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        _ => xsrf_error_response(),
    }
}

fn xsrf_error_response() -> Response {
    (StatusCode::FORBIDDEN, "Invalid or missing XSRF token").into_response()
}
