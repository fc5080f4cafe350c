use serde::Serialize;

use super::ApiClient;
use crate::error::AppResult;
use crate::models::{Journal, NewJournal};

const PATH: &str = "/api/v1/journal";

/// Query parameters forwarded to the journal list endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JournalFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

pub async fn list_journals(
    api: &ApiClient,
    token: &str,
    filter: &JournalFilter,
) -> AppResult<Vec<Journal>> {
    api.get_query(token, PATH, filter).await
}

pub async fn get_journal(api: &ApiClient, token: &str, id: i64) -> AppResult<Journal> {
    api.get(token, &format!("{}/{}", PATH, id)).await
}

pub async fn create_journal(api: &ApiClient, token: &str, journal: &NewJournal) -> AppResult<()> {
    api.post(token, PATH, journal).await
}

/// Ask the backend to post a draft batch to the ledger.
pub async fn post_journal(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.post(token, &format!("{}/{}/post", PATH, id), &serde_json::json!({}))
        .await
}

pub async fn delete_journal(api: &ApiClient, token: &str, id: i64) -> AppResult<()> {
    api.delete(token, &format!("{}/{}", PATH, id)).await
}
