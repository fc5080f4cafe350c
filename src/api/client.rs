use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::forms::FieldErrors;

/// Successful bodies are either wrapped in `{"data": ...}` or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<FieldErrors>,
}

/// Thin HTTP wrapper around the backend API.
///
/// Every call carries the caller's bearer token; the client itself holds no
/// credentials and is cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sacco-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> AppResult<T> {
        let req = self.request(Method::GET, path, Some(token));
        self.fetch(req, Method::GET, path).await
    }

    pub async fn get_query<T, Q>(&self, token: &str, path: &str, query: &Q) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let req = self.request(Method::GET, path, Some(token)).query(query);
        self.fetch(req, Method::GET, path).await
    }

    /// POST that expects a typed response body.
    pub async fn post_json<T, B>(&self, token: Option<&str>, path: &str, body: &B) -> AppResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path, token).json(body);
        self.fetch(req, Method::POST, path).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> AppResult<()> {
        let req = self.request(Method::POST, path, Some(token)).json(body);
        self.execute(req, Method::POST, path).await.map(|_| ())
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> AppResult<()> {
        let req = self.request(Method::PUT, path, Some(token)).json(body);
        self.execute(req, Method::PUT, path).await.map(|_| ())
    }

    pub async fn delete(&self, token: &str, path: &str) -> AppResult<()> {
        let req = self.request(Method::DELETE, path, Some(token));
        self.execute(req, Method::DELETE, path).await.map(|_| ())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        method: Method,
        path: &str,
    ) -> AppResult<T> {
        let bytes = self.execute(req, method, path).await?;
        match serde_json::from_slice::<Envelope<T>>(&bytes) {
            Ok(envelope) => Ok(envelope.into_inner()),
            Err(e) => {
                warn!(path, error = %e, "Unexpected response shape from backend");
                Err(AppError::Internal(format!(
                    "Unexpected response from {}: {}",
                    path, e
                )))
            }
        }
    }

    /// Send the request and return the raw body of a successful response.
    async fn execute(
        &self,
        req: RequestBuilder,
        method: Method,
        path: &str,
    ) -> AppResult<Vec<u8>> {
        let started = Instant::now();
        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?.to_vec();

        debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend call"
        );

        if status.is_success() {
            return Ok(bytes);
        }
        Err(error_from_response(status, &bytes))
    }
}

fn error_from_response(status: StatusCode, bytes: &[u8]) -> AppError {
    if status == StatusCode::UNAUTHORIZED {
        return AppError::Unauthorized;
    }

    let body: ErrorBody = serde_json::from_slice(bytes).unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    AppError::Api {
        status: status.as_u16(),
        message,
        field_errors: body.errors.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://backend:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.url("/api/v1/division"),
            "http://backend:8000/api/v1/division"
        );
    }

    #[test]
    fn test_envelope_accepts_wrapped_and_bare() {
        let wrapped: Envelope<Vec<i64>> = serde_json::from_str(r#"{"data": [1, 2]}"#).unwrap();
        assert_eq!(wrapped.into_inner(), vec![1, 2]);
        let bare: Envelope<Vec<i64>> = serde_json::from_str("[3]").unwrap();
        assert_eq!(bare.into_inner(), vec![3]);
    }

    #[test]
    fn test_error_body_with_field_errors() {
        let err = error_from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"message": "The given data was invalid.", "errors": {"code": ["taken"]}}"#,
        );
        match err {
            AppError::Api {
                status,
                message,
                field_errors,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "The given data was invalid.");
                assert_eq!(field_errors.get("code"), Some("taken"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_error_without_body_uses_reason_phrase() {
        let err = error_from_response(StatusCode::NOT_FOUND, b"");
        assert_eq!(err.user_message(), "Not Found");
    }

    #[test]
    fn test_unauthorized_maps_to_session_expiry() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, br#"{"message": "expired"}"#);
        assert!(matches!(err, AppError::Unauthorized));
    }
}
