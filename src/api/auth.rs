use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::AppResult;
use crate::models::User;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

/// Exchange credentials for a bearer token. A 401 from the backend surfaces
/// as `AppError::Unauthorized`.
pub async fn login(api: &ApiClient, email: &str, password: &str) -> AppResult<LoginResponse> {
    api.post_json(None, "/api/v1/auth/login", &Credentials { email, password })
        .await
}

pub async fn logout(api: &ApiClient, token: &str) -> AppResult<()> {
    api.post(token, "/api/v1/auth/logout", &serde_json::json!({}))
        .await
}
