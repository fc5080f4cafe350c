use serde::{Deserialize, Serialize};

use super::money;

/// A ledger account held under a chart-of-accounts record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub number: String,
    pub name: String,
    pub coa_id: i64,
    #[serde(default)]
    pub coa_name: Option<String>,
    #[serde(default)]
    pub division_id: Option<i64>,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub balance: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Account {
    pub fn display_name(&self) -> String {
        format!("{} · {}", self.number, self.name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccountPayload {
    pub number: String,
    pub name: String,
    pub coa_id: i64,
    pub division_id: Option<i64>,
    pub is_active: bool,
}
