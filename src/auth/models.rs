//! Authentication Models
//! Mission: Define user, role and token data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User account as stored in the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // bcrypt hash - never serialize
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User roles, ordered from least to most privileged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Admin,
    Superadmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Admin => "admin",
            UserRole::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role string read from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown user role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(UserRole::Member),
            "admin" => Ok(UserRole::Admin),
            "superadmin" => Ok(UserRole::Superadmin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Role tier required by a protected route.
///
/// Each tier admits a fixed set of roles; higher tiers admit fewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    Member,
    Admin,
    Superadmin,
}

impl RoleTier {
    pub fn allowed_roles(&self) -> &'static [UserRole] {
        match self {
            RoleTier::Member => &[UserRole::Member, UserRole::Admin, UserRole::Superadmin],
            RoleTier::Admin => &[UserRole::Admin, UserRole::Superadmin],
            RoleTier::Superadmin => &[UserRole::Superadmin],
        }
    }

    pub fn permits(&self, role: UserRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>, // only present when an expiry is configured
}

/// Registration request body.
///
/// Fields are optional so that missing values surface as a validation
/// failure rather than a body rejection. Any `role` key is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request body
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User response (sanitized)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile returned by the self-lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl ProfileResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Login response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoginResponse {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            token,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Trim and lowercase an email address before lookup or storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Treat absent and empty values the same way; whitespace counts as a value
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Like `non_empty`, but also rejects whitespace-only values.
///
/// Used for emails, which are trimmed before lookup or storage.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_serialization() {
        let admin = UserRole::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""admin""#);

        let superadmin: UserRole = serde_json::from_str(r#""superadmin""#).unwrap();
        assert_eq!(superadmin, UserRole::Superadmin);
    }

    #[test]
    fn test_user_role_string_conversion() {
        assert_eq!(UserRole::Member.as_str(), "member");
        assert_eq!(UserRole::Superadmin.to_string(), "superadmin");

        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("MEMBER".parse::<UserRole>(), Ok(UserRole::Member));
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_tiers() {
        assert!(RoleTier::Member.permits(UserRole::Member));
        assert!(RoleTier::Member.permits(UserRole::Superadmin));

        assert!(!RoleTier::Admin.permits(UserRole::Member));
        assert!(RoleTier::Admin.permits(UserRole::Admin));
        assert!(RoleTier::Admin.permits(UserRole::Superadmin));

        assert!(!RoleTier::Superadmin.permits(UserRole::Member));
        assert!(!RoleTier::Superadmin.permits(UserRole::Admin));
        assert!(RoleTier::Superadmin.permits(UserRole::Superadmin));
    }

    #[test]
    fn test_user_never_serializes_password() {
        let user = User {
            id: 1,
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            hashed_password: "$2b$10$secret".to_string(),
            role: UserRole::Member,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("hashedPassword").is_none());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["role"], "member");
    }

    #[test]
    fn test_register_request_ignores_role() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"p","role":"superadmin"}"#,
        )
        .unwrap();
        assert_eq!(req.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }

    #[test]
    fn test_presence_checks() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("   ".to_string())), Some("   ".to_string()));
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));

        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some(" a@x.com".to_string())), Some(" a@x.com".to_string()));
    }
}
