use super::ApiClient;
use crate::error::AppResult;
use crate::models::{JournalType, JournalTypePayload};

const PATH: &str = "/api/v1/journal-type";

pub async fn list_journal_types(api: &ApiClient, token: &str) -> AppResult<Vec<JournalType>> {
    api.get(token, PATH).await
}

pub async fn get_journal_type(api: &ApiClient, token: &str, id: i64) -> AppResult<JournalType> {
    api.get(token, &format!("{}/{}", PATH, id)).await
}

pub async fn create_journal_type(
    api: &ApiClient,
    token: &str,
    payload: &JournalTypePayload,
) -> AppResult<()> {
    api.post(token, PATH, payload).await
}

pub async fn update_journal_type(
    api: &ApiClient,
    token: &str,
    id: i64,
    payload: &JournalTypePayload,
) -> AppResult<()> {
    api.put(token, &format!("{}/{}", PATH, id), payload).await
}

pub async fn delete_journal_type(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.delete(token, &format!("{}/{}", PATH, id)).await
}
