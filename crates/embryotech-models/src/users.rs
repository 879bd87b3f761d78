//! User domain models and DTOs.
//!
//! Users are never deleted. Registration creates non-admin accounts; the
//! admin flag and password are changed afterwards by an administrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::ids::UserId;

pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// A user account.
///
/// `password_hash` is loaded for credential checks and never serialized.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to persist a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Self-service registration.
///
/// Fields default to empty so a missing field is reported by validation
/// and still reaches the audit trail.
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct RegisterUserDto {
    #[serde(default)]
    #[validate(length(min = 3, max = 80, message = "username must be 3 to 80 characters"))]
    pub username: String,
    #[serde(default)]
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 120, message = "email must be at most 120 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct ChangePasswordDto {
    #[serde(rename = "nova_senha")]
    #[validate(length(min = 6, message = "nova_senha must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Deserialize, Debug, Clone, Copy, Validate)]
pub struct SetAdminDto {
    pub is_admin: bool,
}

/// Which accounts a user report covers.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Admin,
    User,
}

impl UserKind {
    pub fn matches(self, user: &User) -> bool {
        match self {
            Self::Admin => user.is_admin,
            Self::User => !user.is_admin,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UserReportParams {
    #[serde(rename = "tipo")]
    pub kind: Option<UserKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool) -> User {
        User {
            id: UserId::new(1),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$2b$04$hash".into(),
            is_admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(user(false)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["is_admin"], false);
    }

    #[test]
    fn test_register_validation() {
        let dto: RegisterUserDto = serde_json::from_str(r#"{"username":"al"}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));

        let dto = RegisterUserDto {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "segredo".into(),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_change_password_uses_wire_name() {
        let dto: ChangePasswordDto = serde_json::from_str(r#"{"nova_senha":"12345"}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_user_kind_filter() {
        assert!(UserKind::Admin.matches(&user(true)));
        assert!(!UserKind::Admin.matches(&user(false)));
        assert!(UserKind::User.matches(&user(false)));
        let params: UserReportParams = serde_json::from_str(r#"{"tipo":"admin"}"#).unwrap();
        assert_eq!(params.kind, Some(UserKind::Admin));
    }
}
