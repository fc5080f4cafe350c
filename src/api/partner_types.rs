use super::ApiClient;
use crate::error::AppResult;
use crate::models::{PartnerType, PartnerTypePayload};

const PATH: &str = "/api/v1/partner-type";

pub async fn list_partner_types(api: &ApiClient, token: &str) -> AppResult<Vec<PartnerType>> {
    api.get(token, PATH).await
}

pub async fn get_partner_type(api: &ApiClient, token: &str, id: i64) -> AppResult<PartnerType> {
    api.get(token, &format!("{}/{}", PATH, id)).await
}

pub async fn create_partner_type(
    api: &ApiClient,
    token: &str,
    payload: &PartnerTypePayload,
) -> AppResult<()> {
    api.post(token, PATH, payload).await
}

pub async fn update_partner_type(
    api: &ApiClient,
    token: &str,
    id: i64,
    payload: &PartnerTypePayload,
) -> AppResult<()> {
    api.put(token, &format!("{}/{}", PATH, id), payload).await
}

pub async fn delete_partner_type(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.delete(token, &format!("{}/{}", PATH, id)).await
}
