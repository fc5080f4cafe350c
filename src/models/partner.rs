use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerType {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PartnerTypePayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    pub name: String,
    pub partner_type_id: i64,
    #[serde(default)]
    pub partner_type_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub division_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Partner {
    /// Type name from the response, or looked up from the type list.
    pub fn type_label(&self, types: &[PartnerType]) -> String {
        self.partner_type_name
            .clone()
            .or_else(|| {
                types
                    .iter()
                    .find(|t| t.id == self.partner_type_id)
                    .map(|t| t.name.clone())
            })
            .unwrap_or_else(|| "-".into())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PartnerPayload {
    pub name: String,
    pub partner_type_id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub division_id: Option<i64>,
}
