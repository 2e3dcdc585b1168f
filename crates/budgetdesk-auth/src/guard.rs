//! Per-request access check.
//!
//! Every authorized request spends its server token: the token is revoked
//! and a fresh one is returned for the caller to hand back to the client.

use std::sync::Arc;

use tracing::debug;

use budgetdesk_core::error::{AppError, ErrorKind};

use crate::jwt::{IssuedToken, TokenCodec};
use crate::revocation::RevocationCache;
use crate::session::{Principal, SessionAuthority};

/// Required privilege for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// Any active user.
    Authenticated,
    /// Active users with the ADMIN role.
    Admin,
}

/// A successful authorization.
#[derive(Debug, Clone)]
pub struct AccessGranted {
    /// The authenticated principal.
    pub principal: Principal,
    /// Server token replacing the one presented.
    pub rotated: IssuedToken,
}

/// A rejected authorization.
#[derive(Debug, Clone)]
pub struct AccessDenied {
    /// Error to report to the caller.
    pub error: AppError,
    /// Whether the caller's auth cookie should be cleared.
    pub clear_cookie: bool,
}

impl AccessDenied {
    fn keep_cookie(error: AppError) -> Self {
        Self {
            error,
            clear_cookie: false,
        }
    }

    fn clear_cookie(error: AppError) -> Self {
        Self {
            error,
            clear_cookie: true,
        }
    }
}

/// Gate in front of authenticated routes.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    authority: Arc<SessionAuthority>,
    revocations: Arc<RevocationCache>,
    codec: Arc<TokenCodec>,
}

impl AccessGuard {
    /// Creates a new guard.
    pub fn new(
        authority: Arc<SessionAuthority>,
        revocations: Arc<RevocationCache>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            authority,
            revocations,
            codec,
        }
    }

    /// Authorize a request presenting `token` at `level`.
    ///
    /// Checks, in order: presence, revocation, signature and expiry, the
    /// active flag, and for [`AccessLevel::Admin`] the admin flag. On
    /// success the presented token is revoked and replaced.
    pub async fn authorize(
        &self,
        token: Option<&str>,
        level: AccessLevel,
    ) -> Result<AccessGranted, AccessDenied> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Err(AccessDenied::keep_cookie(AppError::unauthorized(
                "User is not authenticated",
            )));
        };

        if self.revocations.is_revoked(token).await {
            return Err(AccessDenied::clear_cookie(AppError::unauthorized(
                "User is not authenticated",
            )));
        }

        let claims = self.codec.verify(token).map_err(AccessDenied::keep_cookie)?;

        match self.authority.is_user_active(claims.id).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(AccessDenied::clear_cookie(AppError::unauthorized(
                    "User is not active",
                )));
            }
            Err(e) if e.kind == ErrorKind::NotFound => {
                return Err(AccessDenied::clear_cookie(AppError::unauthorized(
                    "User is not active",
                )));
            }
            Err(e) => return Err(AccessDenied::keep_cookie(e)),
        }

        if level == AccessLevel::Admin {
            match self.authority.is_user_admin(claims.id).await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(AccessDenied::keep_cookie(AppError::forbidden(
                        "User is not admin",
                    )));
                }
                Err(e) if e.kind == ErrorKind::NotFound => {
                    return Err(AccessDenied::clear_cookie(AppError::unauthorized(
                        "User is not active",
                    )));
                }
                Err(e) => return Err(AccessDenied::keep_cookie(e)),
            }
        }

        let principal = Principal {
            id: claims.id,
            username: claims.username,
        };
        let rotated = self
            .authority
            .refresh_server_token(&principal.payload(), token)
            .await
            .map_err(AccessDenied::keep_cookie)?;

        debug!(user_id = %principal.id, ?level, "Request authorized");
        Ok(AccessGranted { principal, rotated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetdesk_cache::provider::CacheManager;
    use budgetdesk_core::config::{AuthConfig, BootstrapAdminConfig};
    use budgetdesk_database::repositories::{MemoryUserDirectory, UserDirectory};
    use budgetdesk_entity::user::AdminUserChanges;
    use chrono::Duration;

    use crate::jwt::TokenPayload;
    use crate::password::{PasswordHasher, PasswordValidator};
    use crate::session::{Credentials, Registration};

    struct Fixture {
        guard: AccessGuard,
        authority: Arc<SessionAuthority>,
        codec: Arc<TokenCodec>,
        directory: Arc<MemoryUserDirectory>,
    }

    fn fixture() -> Fixture {
        let config = AuthConfig::with_secret("guard-test-secret");
        let codec = Arc::new(TokenCodec::new(&config).unwrap());
        let revocations = Arc::new(RevocationCache::new(
            Arc::new(CacheManager::in_memory()),
            &config,
        ));
        let directory = Arc::new(MemoryUserDirectory::new());
        let authority = Arc::new(SessionAuthority::new(
            Arc::clone(&codec),
            Arc::clone(&revocations),
            directory.clone(),
            Arc::new(PasswordHasher::new()),
            Arc::new(PasswordValidator::new()),
            &config,
        ));
        let guard = AccessGuard::new(
            Arc::clone(&authority),
            Arc::clone(&revocations),
            Arc::clone(&codec),
        );
        Fixture {
            guard,
            authority,
            codec,
            directory,
        }
    }

    async fn login_user(f: &Fixture) -> (uuid::Uuid, String) {
        let user = f
            .authority
            .register(Registration {
                username: "lrojas".to_string(),
                email: "lrojas@example.com".to_string(),
                password: "Secreto1!".to_string(),
            })
            .await
            .unwrap();
        let pair = f
            .authority
            .login(Credentials {
                email: "lrojas@example.com".to_string(),
                password: "Secreto1!".to_string(),
            })
            .await
            .unwrap();
        (user.id, pair.server_token)
    }

    #[tokio::test]
    async fn test_missing_token() {
        let f = fixture();
        let denied = f
            .guard
            .authorize(None, AccessLevel::Authenticated)
            .await
            .unwrap_err();
        assert_eq!(denied.error.kind, ErrorKind::Unauthorized);
        assert!(!denied.clear_cookie);
    }

    #[tokio::test]
    async fn test_rotation_spends_the_presented_token() {
        let f = fixture();
        let (id, token) = login_user(&f).await;

        let granted = f
            .guard
            .authorize(Some(&token), AccessLevel::Authenticated)
            .await
            .unwrap();
        assert_eq!(granted.principal.id, id);
        assert_ne!(granted.rotated.token, token);

        let denied = f
            .guard
            .authorize(Some(&token), AccessLevel::Authenticated)
            .await
            .unwrap_err();
        assert_eq!(denied.error.kind, ErrorKind::Unauthorized);
        assert!(denied.clear_cookie);

        f.guard
            .authorize(Some(&granted.rotated.token), AccessLevel::Authenticated)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logged_out_token_is_rejected() {
        let f = fixture();
        let (_, token) = login_user(&f).await;
        f.authority.logout(Some(&token)).await.unwrap();

        assert!(f.codec.verify(&token).is_ok());
        let denied = f
            .guard
            .authorize(Some(&token), AccessLevel::Authenticated)
            .await
            .unwrap_err();
        assert_eq!(denied.error.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let f = fixture();
        let (id, _) = login_user(&f).await;
        let expired = f
            .codec
            .sign(&TokenPayload::identity(id, "lrojas"), Duration::seconds(-60))
            .unwrap();

        let denied = f
            .guard
            .authorize(Some(&expired), AccessLevel::Authenticated)
            .await
            .unwrap_err();
        assert_eq!(denied.error.kind, ErrorKind::Unauthorized);
        assert!(!denied.clear_cookie);
    }

    #[tokio::test]
    async fn test_inactive_and_unknown_users_clear_cookie() {
        let f = fixture();
        let (id, token) = login_user(&f).await;
        f.directory
            .update_role_and_status(id, &AdminUserChanges::active(false))
            .await
            .unwrap();

        let denied = f
            .guard
            .authorize(Some(&token), AccessLevel::Authenticated)
            .await
            .unwrap_err();
        assert_eq!(denied.error.kind, ErrorKind::Unauthorized);
        assert!(denied.clear_cookie);

        let ghost = f
            .codec
            .sign(
                &TokenPayload::identity(uuid::Uuid::new_v4(), "ghost"),
                Duration::minutes(5),
            )
            .unwrap();
        let denied = f
            .guard
            .authorize(Some(&ghost), AccessLevel::Authenticated)
            .await
            .unwrap_err();
        assert_eq!(denied.error.kind, ErrorKind::Unauthorized);
        assert!(denied.clear_cookie);
    }

    #[tokio::test]
    async fn test_admin_level() {
        let f = fixture();
        let (_, token) = login_user(&f).await;
        let denied = f
            .guard
            .authorize(Some(&token), AccessLevel::Admin)
            .await
            .unwrap_err();
        assert_eq!(denied.error.kind, ErrorKind::Forbidden);

        f.authority
            .ensure_admin(&BootstrapAdminConfig {
                email: "root@example.com".to_string(),
                username: "rootadmin".to_string(),
                password: "Admin123!".to_string(),
            })
            .await
            .unwrap();
        let pair = f
            .authority
            .login(Credentials {
                email: "root@example.com".to_string(),
                password: "Admin123!".to_string(),
            })
            .await
            .unwrap();
        f.guard
            .authorize(Some(&pair.server_token), AccessLevel::Admin)
            .await
            .unwrap();
    }
}
