use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for create and update requests.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DivisionPayload {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}
