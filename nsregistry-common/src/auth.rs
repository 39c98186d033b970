///! Caller identity and role types

use serde::{Deserialize, Serialize};

/// Platform role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Sees and manages every namespace
    Admin,
    /// Sees owned and granted namespaces only
    #[default]
    General,
}

impl UserRole {
    /// Parse a role as stored in the users table or carried in a token.
    /// Unknown values fall back to `General`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "admin" | "administrator" => UserRole::Admin,
            _ => UserRole::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::General => "general",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated identity, either the caller of a request or the
/// subject of an admin query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl Principal {
    pub fn new(user_id: i64, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("admin"), UserRole::Admin);
        assert_eq!(UserRole::parse("Administrator"), UserRole::Admin);
        assert_eq!(UserRole::parse("general"), UserRole::General);
        assert_eq!(UserRole::parse("something-else"), UserRole::General);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&UserRole::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }
}
