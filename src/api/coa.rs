use super::ApiClient;
use crate::error::AppResult;
use crate::models::{ChartOfAccount, CoaPayload};

const PATH: &str = "/api/v1/chart-of-accounts";

pub async fn list_coa(api: &ApiClient, token: &str) -> AppResult<Vec<ChartOfAccount>> {
    api.get(token, PATH).await
}

pub async fn get_coa(api: &ApiClient, token: &str, id: i64) -> AppResult<ChartOfAccount> {
    api.get(token, &format!("{}/{}", PATH, id)).await
}

pub async fn create_coa(api: &ApiClient, token: &str, payload: &CoaPayload) -> AppResult<()> {
    api.post(token, PATH, payload).await
}

pub async fn update_coa(
    api: &ApiClient,
    token: &str,
    id: i64,
    payload: &CoaPayload,
) -> AppResult<()> {
    api.put(token, &format!("{}/{}", PATH, id), payload).await
}

pub async fn delete_coa(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.delete(token, &format!("{}/{}", PATH, id)).await
}
