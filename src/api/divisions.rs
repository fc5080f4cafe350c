use super::ApiClient;
use crate::error::AppResult;
use crate::models::{Division, DivisionPayload};

const PATH: &str = "/api/v1/division";

pub async fn list_divisions(api: &ApiClient, token: &str) -> AppResult<Vec<Division>> {
    api.get(token, PATH).await
}

pub async fn get_division(api: &ApiClient, token: &str, id: i64) -> AppResult<Division> {
    api.get(token, &format!("{}/{}", PATH, id)).await
}

pub async fn create_division(
    api: &ApiClient,
    token: &str,
    payload: &DivisionPayload,
) -> AppResult<()> {
    api.post(token, PATH, payload).await
}

pub async fn update_division(
    api: &ApiClient,
    token: &str,
    id: i64,
    payload: &DivisionPayload,
) -> AppResult<()> {
    api.put(token, &format!("{}/{}", PATH, id), payload).await
}

pub async fn delete_division(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.delete(token, &format!("{}/{}", PATH, id)).await
}
