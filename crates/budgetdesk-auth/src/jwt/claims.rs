//! JWT claims structure shared by client and server tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use budgetdesk_entity::user::UserRole;

/// Identity data embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// User ID.
    pub id: Uuid,
    /// Username at the time of issuance.
    pub username: String,
    /// Role at the time of issuance. Rotated server tokens carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl TokenPayload {
    /// Payload with a role, as issued at login.
    pub fn new(id: Uuid, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            username: username.into(),
            role: Some(role),
        }
    }

    /// Payload without a role, as used for rotation.
    pub fn identity(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            role: None,
        }
    }
}

/// JWT claims payload embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// User role, when the token was issued with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Random token ID; keeps tokens minted in the same second distinct.
    pub jti: Uuid,
}

impl Claims {
    /// The identity part of the claims.
    pub fn payload(&self) -> TokenPayload {
        TokenPayload {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
