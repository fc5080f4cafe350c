use serde::{Deserialize, Serialize};

use super::money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalType {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JournalTypePayload {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    #[default]
    #[serde(alias = "Draft", alias = "DRAFT", alias = "pending")]
    Draft,
    #[serde(alias = "Posted", alias = "POSTED")]
    Posted,
}

impl JournalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalStatus::Draft => "draft",
            JournalStatus::Posted => "posted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JournalStatus::Draft => "Draft",
            JournalStatus::Posted => "Posted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(JournalStatus::Draft),
            "posted" => Some(JournalStatus::Posted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_id: i64,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub partner_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub debit: i64,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub credit: i64,
}

/// A journal batch: header plus its debit/credit lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub id: i64,
    #[serde(default)]
    pub reference: String,
    pub journal_type_id: i64,
    #[serde(default)]
    pub journal_type_name: Option<String>,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: JournalStatus,
    #[serde(default)]
    pub lines: Vec<JournalLine>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_debit: Option<i64>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_credit: Option<i64>,
}

impl Journal {
    /// Backend-reported total, or the sum of the lines when the list view omits it.
    pub fn debit_total(&self) -> i64 {
        self.total_debit
            .unwrap_or_else(|| self.lines.iter().map(|l| l.debit).sum())
    }

    pub fn credit_total(&self) -> i64 {
        self.total_credit
            .unwrap_or_else(|| self.lines.iter().map(|l| l.credit).sum())
    }

    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }

    pub fn is_draft(&self) -> bool {
        self.status == JournalStatus::Draft
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewJournalLine {
    pub account_id: i64,
    pub partner_id: Option<i64>,
    pub description: Option<String>,
    #[serde(serialize_with = "money::serialize_cents")]
    pub debit: i64,
    #[serde(serialize_with = "money::serialize_cents")]
    pub credit: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewJournal {
    pub reference: String,
    pub journal_type_id: i64,
    pub date: String,
    pub description: Option<String>,
    pub lines: Vec<NewJournalLine>,
}
