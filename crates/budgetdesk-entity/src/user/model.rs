//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered principal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name (compared case-insensitively).
    pub username: String,
    /// Unique email address, stored lowercased.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// User role (RBAC).
    pub role: UserRole,
    /// Soft-delete flag. Inactive users cannot log in.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Email address, already lowercased.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
    /// Initial active flag.
    pub is_active: bool,
}

/// Partial profile update a user may apply to their own account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserChanges {
    /// New email address.
    pub email: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New pre-hashed password.
    pub password_hash: Option<String>,
}

impl UserChanges {
    /// Whether the update touches no field at all.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.password_hash.is_none()
    }
}

/// Partial update an administrator may apply to any account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUserChanges {
    /// Profile fields.
    pub profile: UserChanges,
    /// New role.
    pub role: Option<UserRole>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl AdminUserChanges {
    /// Change only the active flag.
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    /// Whether the update changes the role or active flag, i.e. anything
    /// cached status checks depend on.
    pub fn touches_status(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::nil(),
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["isActive"], serde_json::json!(true));
    }
}
