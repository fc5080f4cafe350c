use super::ApiClient;
use crate::error::AppResult;
use crate::models::{Account, AccountPayload};

const PATH: &str = "/api/v1/account";

pub async fn list_accounts(api: &ApiClient, token: &str) -> AppResult<Vec<Account>> {
    api.get(token, PATH).await
}

pub async fn get_account(api: &ApiClient, token: &str, id: i64) -> AppResult<Account> {
    api.get(token, &format!("{}/{}", PATH, id)).await
}

pub async fn create_account(
    api: &ApiClient,
    token: &str,
    payload: &AccountPayload,
) -> AppResult<()> {
    api.post(token, PATH, payload).await
}

pub async fn update_account(
    api: &ApiClient,
    token: &str,
    id: i64,
    payload: &AccountPayload,
) -> AppResult<()> {
    api.put(token, &format!("{}/{}", PATH, id), payload).await
}

pub async fn delete_account(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.delete(token, &format!("{}/{}", PATH, id)).await
}
