use super::ApiClient;
use crate::error::AppResult;
use crate::models::{Partner, PartnerPayload};

const PATH: &str = "/api/v1/partner";

pub async fn list_partners(api: &ApiClient, token: &str) -> AppResult<Vec<Partner>> {
    api.get(token, PATH).await
}

pub async fn get_partner(api: &ApiClient, token: &str, id: i64) -> AppResult<Partner> {
    api.get(token, &format!("{}/{}", PATH, id)).await
}

pub async fn create_partner(
    api: &ApiClient,
    token: &str,
    payload: &PartnerPayload,
) -> AppResult<()> {
    api.post(token, PATH, payload).await
}

pub async fn update_partner(
    api: &ApiClient,
    token: &str,
    id: i64,
    payload: &PartnerPayload,
) -> AppResult<()> {
    api.put(token, &format!("{}/{}", PATH, id), payload).await
}

pub async fn delete_partner(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.delete(token, &format!("{}/{}", PATH, id)).await
}
