use serde::{Deserialize, Serialize};

/// Portal roles. Each role owns one area of the portal; reports are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Director,
    Finance,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Finance => "finance",
        }
    }

    /// Backend role names are matched case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "director" => Some(Role::Director),
            "finance" => Some(Role::Finance),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Director => "Director",
            Role::Finance => "Finance",
        }
    }

    /// Landing page after login.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Director => "/director",
            Role::Finance => "/finance",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Two-letter initials for the avatar badge.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("Director"), Some(Role::Director));
        assert_eq!(Role::parse(" FINANCE "), Some(Role::Finance));
        assert_eq!(Role::parse("member"), None);
    }

    #[test]
    fn test_initials() {
        let user = User {
            id: 1,
            name: "grace wanjiru kamau".into(),
            email: "g@example.org".into(),
            role: "director".into(),
        };
        assert_eq!(user.initials(), "GW");
    }
}
