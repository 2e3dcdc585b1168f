//! Inputs and outputs of session operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use budgetdesk_entity::user::UserRole;

use crate::jwt::{IssuedToken, TokenPayload};

/// Data submitted to create an account.
#[derive(Clone, Deserialize)]
pub struct Registration {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Login credentials.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Profile fields a user may change on their own account.
#[derive(Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New email address.
    pub email: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
}

/// Changes an administrator may apply to any account.
#[derive(Clone, Default, Deserialize)]
pub struct AdminProfileUpdate {
    /// Profile fields.
    pub profile: ProfileUpdate,
    /// New role.
    pub role: Option<UserRole>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
}

impl Principal {
    /// Token payload used when rotating this principal's tokens.
    pub fn payload(&self) -> TokenPayload {
        TokenPayload::identity(self.id, self.username.clone())
    }
}

/// Fresh tokens issued after a profile update.
#[derive(Debug, Clone)]
pub struct RotatedTokens {
    /// New client token.
    pub client: IssuedToken,
    /// New server token; the previous one is revoked.
    pub server: IssuedToken,
}

macro_rules! redacted_debug {
    ($ty:ty, $($field:ident),*) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    $(.field(stringify!($field), &self.$field))*
                    .finish_non_exhaustive()
            }
        }
    };
}

redacted_debug!(Registration, username, email);
redacted_debug!(Credentials, email);
redacted_debug!(ProfileUpdate, username, email);
redacted_debug!(AdminProfileUpdate, profile, role, is_active);
