use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::error_pages::ErrorMessage;
use crate::forms::FieldErrors;

#[derive(Error, Debug)]
pub enum AppError {
    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        field_errors: FieldErrors,
    },

    #[error("Backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the bearer token, or there is no session at all.
    #[error("Session expired")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Marker placed in response extensions when the backend token is no longer valid.
/// The auth middleware drops the local session when it sees it.
#[derive(Clone, Copy, Debug)]
pub struct SessionExpired;

impl AppError {
    /// Message suitable for showing to the user in a toast.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api { message, .. } => message.clone(),
            AppError::Transport(_) => "The server could not be reached. Please try again.".into(),
            AppError::Unauthorized => "Your session has expired. Please sign in again.".into(),
            AppError::Forbidden(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Csv(_) | AppError::Internal(_) => "Something went wrong on our end.".into(),
        }
    }

    /// Field-level errors reported by the backend, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Api { field_errors, .. } if !field_errors.is_empty() => Some(field_errors),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Api { status, .. } => match *status {
                400 | 422 => StatusCode::BAD_REQUEST,
                403 => StatusCode::FORBIDDEN,
                404 => StatusCode::NOT_FOUND,
                409 => StatusCode::CONFLICT,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Csv(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Api {
                status: upstream,
                message,
                ..
            } if status == StatusCode::BAD_GATEWAY => {
                tracing::error!(upstream_status = upstream, "Backend error: {}", message);
            }
            AppError::Transport(e) => tracing::error!("Backend transport error: {:?}", e),
            AppError::Csv(e) => tracing::error!("CSV error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }

        let message = self.user_message();
        let html = format!(
            r#"<div class="alert alert-error" role="alert">
                <p>{}</p>
            </div>"#,
            html_escape(&message)
        );

        let mut response = (status, Html(html)).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        if matches!(self, AppError::Unauthorized) {
            response.extensions_mut().insert(SessionExpired);
        }
        response
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub type AppResult<T> = Result<T, AppError>;

pub trait RenderHtml {
    fn render_html(self) -> AppResult<Html<String>>;
}

impl<T: Template> RenderHtml for T {
    fn render_html(self) -> AppResult<Html<String>> {
        self.render()
            .map(Html)
            .map_err(|e| AppError::Internal(format!("Template error: {}", e)))
    }
}
