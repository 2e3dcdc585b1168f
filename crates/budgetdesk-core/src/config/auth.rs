//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Required.
    #[serde(default)]
    pub jwt_secret: String,
    /// Client token TTL in minutes.
    #[serde(default = "default_client_ttl")]
    pub client_token_ttl_minutes: u64,
    /// Server token TTL in hours.
    #[serde(default = "default_server_ttl")]
    pub server_token_ttl_hours: u64,
    /// How long a revoked server token stays on the blacklist, in hours.
    #[serde(default = "default_revocation_ttl")]
    pub revocation_ttl_hours: u64,
    /// How long cached `isActive` / `isAdmin` flags live, in hours.
    #[serde(default = "default_status_ttl")]
    pub status_cache_ttl_hours: u64,
    /// Administrator account created at startup when missing.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Credentials of the administrator account seeded on first start.
#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapAdminConfig {
    /// Login email.
    pub email: String,
    /// Username.
    pub username: String,
    /// Plaintext password, hashed before it is stored.
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdminConfig")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Build a configuration with the given secret and default lifetimes.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            client_token_ttl_minutes: default_client_ttl(),
            server_token_ttl_hours: default_server_ttl(),
            revocation_ttl_hours: default_revocation_ttl(),
            status_cache_ttl_hours: default_status_ttl(),
            bootstrap_admin: None,
        }
    }

    /// Lifetime of client tokens.
    pub fn client_token_ttl(&self) -> Duration {
        Duration::from_secs(self.client_token_ttl_minutes * 60)
    }

    /// Lifetime of server tokens.
    pub fn server_token_ttl(&self) -> Duration {
        Duration::from_secs(self.server_token_ttl_hours * 3600)
    }

    /// Lifetime of blacklist entries.
    pub fn revocation_ttl(&self) -> Duration {
        Duration::from_secs(self.revocation_ttl_hours * 3600)
    }

    /// Lifetime of cached status flags.
    pub fn status_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.status_cache_ttl_hours * 3600)
    }

    /// Fail fast on settings no token operation could run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        if self.client_token_ttl() >= self.server_token_ttl() {
            return Err(AppError::configuration(
                "auth.client_token_ttl_minutes must be shorter than auth.server_token_ttl_hours",
            ));
        }
        Ok(())
    }
}

fn default_client_ttl() -> u64 {
    15
}

fn default_server_ttl() -> u64 {
    24
}

fn default_revocation_ttl() -> u64 {
    24
}

fn default_status_ttl() -> u64 {
    24
}
