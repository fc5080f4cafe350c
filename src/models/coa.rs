use serde::{Deserialize, Serialize};

/// Top-level classification of a chart-of-accounts record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoaCategory {
    #[serde(alias = "Asset", alias = "ASSET")]
    Asset,
    #[serde(alias = "Liability", alias = "LIABILITY")]
    Liability,
    #[serde(alias = "Equity", alias = "EQUITY")]
    Equity,
    #[serde(alias = "Income", alias = "INCOME", alias = "revenue")]
    Income,
    #[serde(alias = "Expense", alias = "EXPENSE")]
    Expense,
}

impl CoaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoaCategory::Asset => "asset",
            CoaCategory::Liability => "liability",
            CoaCategory::Equity => "equity",
            CoaCategory::Income => "income",
            CoaCategory::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoaCategory::Asset => "Asset",
            CoaCategory::Liability => "Liability",
            CoaCategory::Equity => "Equity",
            CoaCategory::Income => "Income",
            CoaCategory::Expense => "Expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn all() -> &'static [CoaCategory] {
        &[
            CoaCategory::Asset,
            CoaCategory::Liability,
            CoaCategory::Equity,
            CoaCategory::Income,
            CoaCategory::Expense,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartOfAccount {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub category: CoaCategory,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ChartOfAccount {
    pub fn display_name(&self) -> String {
        format!("{} · {}", self.code, self.name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CoaPayload {
    pub code: String,
    pub name: String,
    pub category: CoaCategory,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accepts_backend_casing() {
        let c: CoaCategory = serde_json::from_str(r#""ASSET""#).unwrap();
        assert_eq!(c, CoaCategory::Asset);
        let c: CoaCategory = serde_json::from_str(r#""revenue""#).unwrap();
        assert_eq!(c, CoaCategory::Income);
        assert_eq!(CoaCategory::parse("Expense"), Some(CoaCategory::Expense));
        assert_eq!(CoaCategory::parse("cash"), None);
    }

    #[test]
    fn test_is_active_defaults_true() {
        let coa: ChartOfAccount = serde_json::from_str(
            r#"{"id": 1, "code": "1000", "name": "Cash", "category": "asset"}"#,
        )
        .unwrap();
        assert!(coa.is_active);
        assert_eq!(coa.display_name(), "1000 · Cash");
    }
}
