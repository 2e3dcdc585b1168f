//! Session authority: registration, login, logout, token refresh and
//! user administration.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use budgetdesk_core::config::{AuthConfig, BootstrapAdminConfig};
use budgetdesk_core::error::AppError;
use budgetdesk_core::result::AppResult;
use budgetdesk_database::repositories::UserDirectory;
use budgetdesk_entity::user::{AdminUserChanges, NewUser, User, UserChanges, UserRole};

use crate::jwt::{IssuedToken, TokenCodec, TokenPair, TokenPayload};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::revocation::{RevocationCache, StatusFlag};

use super::types::{AdminProfileUpdate, Credentials, ProfileUpdate, Registration, RotatedTokens};

/// Owns the dual-token contract and every change to a principal's
/// credentials, role or active state.
#[derive(Clone)]
pub struct SessionAuthority {
    /// Token signing and verification.
    codec: Arc<TokenCodec>,
    /// Blacklist and status flag cache.
    revocations: Arc<RevocationCache>,
    /// User persistence.
    directory: Arc<dyn UserDirectory>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password policy.
    validator: Arc<PasswordValidator>,
    /// How long revoked server tokens stay blacklisted.
    revocation_ttl: Duration,
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("codec", &self.codec)
            .field("revocation_ttl", &self.revocation_ttl)
            .finish_non_exhaustive()
    }
}

impl SessionAuthority {
    /// Creates a new session authority with all required dependencies.
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationCache>,
        directory: Arc<dyn UserDirectory>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            codec,
            revocations,
            directory,
            hasher,
            validator,
            revocation_ttl: config.revocation_ttl(),
        }
    }

    /// Creates a USER account.
    ///
    /// Email is checked before username; either collision is a `Conflict`
    /// naming the field.
    pub async fn register(&self, registration: Registration) -> AppResult<User> {
        let outcome: AppResult<User> = async {
            self.validator.validate(&registration.password)?;

            let email = registration.email.trim().to_lowercase();
            if self.directory.find_by_email(&email).await?.is_some() {
                return Err(AppError::conflict("An account with that email already exists")
                    .on_field("email"));
            }
            if self
                .directory
                .find_by_username(&registration.username)
                .await?
                .is_some()
            {
                return Err(AppError::conflict("Username is already in use").on_field("username"));
            }

            let password_hash = self.hasher.hash_password(&registration.password)?;
            let user = self
                .directory
                .insert(&NewUser {
                    username: registration.username,
                    email,
                    password_hash,
                    role: UserRole::User,
                    is_active: true,
                })
                .await?;

            info!(user_id = %user.id, username = %user.username, "User registered");
            Ok(user)
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not register the user. Try again later."))
    }

    /// Checks credentials and issues a client/server token pair.
    pub async fn login(&self, credentials: Credentials) -> AppResult<TokenPair> {
        let outcome: AppResult<TokenPair> = async {
            let email = credentials.email.trim().to_lowercase();
            let user = self
                .directory
                .find_by_email(&email)
                .await?
                .ok_or_else(|| AppError::not_found("No account exists with that email"))?;

            if !user.is_active {
                return Err(AppError::unauthorized(
                    "Your account is inactive. Please contact support.",
                ));
            }

            if !self
                .hasher
                .verify_password(&credentials.password, &user.password_hash)?
            {
                return Err(AppError::unauthorized("Incorrect password"));
            }

            let pair = self
                .codec
                .issue_pair(&TokenPayload::new(user.id, &user.username, user.role))?;

            info!(user_id = %user.id, "User logged in");
            Ok(pair)
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not log in. Try again later."))
    }

    /// Revokes the server token, if any. Logging out twice is harmless.
    pub async fn logout(&self, server_token: Option<&str>) -> AppResult<()> {
        if let Some(token) = server_token.filter(|t| !t.is_empty()) {
            self.revocations
                .revoke(token, self.revocation_ttl)
                .await
                .map_err(|e| e.or_internal("Could not log out. Try again later."))?;
        }
        Ok(())
    }

    /// Issues a new client token for an active principal.
    pub async fn refresh_client_token(&self, payload: &TokenPayload) -> AppResult<IssuedToken> {
        let outcome: AppResult<IssuedToken> = async {
            if payload.id.is_nil() || payload.username.trim().is_empty() {
                return Err(AppError::unauthorized("No active session"));
            }
            if !self.is_user_active(payload.id).await? {
                return Err(AppError::unauthorized(
                    "Your account is inactive. Please contact support.",
                ));
            }
            self.codec.issue_client(payload)
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not renew the session. Try again later."))
    }

    /// Revokes `old_token` and issues a new server token for `payload`.
    pub async fn refresh_server_token(
        &self,
        payload: &TokenPayload,
        old_token: &str,
    ) -> AppResult<IssuedToken> {
        let outcome: AppResult<IssuedToken> = async {
            self.revocations
                .revoke(old_token, self.revocation_ttl)
                .await?;
            self.codec
                .issue_server(&TokenPayload::identity(payload.id, &payload.username))
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not renew the session. Try again later."))
    }

    /// Applies a user's own profile update and rotates both tokens.
    ///
    /// `current_token` is the server token the request was authorized
    /// with; it is revoked.
    pub async fn update_user(
        &self,
        id: Uuid,
        current_token: &str,
        changes: ProfileUpdate,
    ) -> AppResult<RotatedTokens> {
        let outcome: AppResult<RotatedTokens> = async {
            let changes = self.prepare_profile(changes)?;
            let user = self.directory.update_partial(id, &changes).await?;
            self.revocations.clear_flags(id).await?;

            let client = self
                .refresh_client_token(&TokenPayload::new(user.id, &user.username, user.role))
                .await?;
            let server = self
                .refresh_server_token(&TokenPayload::identity(user.id, &user.username), current_token)
                .await?;

            info!(user_id = %id, "User updated own profile");
            Ok(RotatedTokens { client, server })
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not update the user. Try again later."))
    }

    /// Applies an administrative update, including role and active flag.
    pub async fn update_user_as_admin(
        &self,
        id: Uuid,
        changes: AdminProfileUpdate,
    ) -> AppResult<User> {
        let outcome: AppResult<User> = async {
            let changes = AdminUserChanges {
                profile: self.prepare_profile(changes.profile)?,
                role: changes.role,
                is_active: changes.is_active,
            };
            let user = self.directory.update_role_and_status(id, &changes).await?;
            self.revocations.clear_flags(id).await?;

            info!(
                user_id = %id,
                role = %user.role,
                is_active = user.is_active,
                "User updated by administrator"
            );
            Ok(user)
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not update the user. Try again later."))
    }

    /// Soft-deletes a user.
    ///
    /// Administrators can delete neither themselves nor other administrators.
    pub async fn delete_user(&self, id: Uuid, admin_id: Uuid) -> AppResult<()> {
        let outcome: AppResult<()> = async {
            let user = self
                .directory
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("User not found"))?;

            if user.id == admin_id {
                return Err(AppError::forbidden("You cannot delete your own account"));
            }
            if user.is_admin() {
                return Err(AppError::forbidden("You cannot delete an administrator"));
            }
            if !user.is_active {
                return Err(AppError::bad_request("User is already inactive"));
            }

            self.directory
                .update_role_and_status(id, &AdminUserChanges::active(false))
                .await?;
            self.revocations.clear_flags(id).await?;

            info!(user_id = %id, admin_id = %admin_id, "User deactivated");
            Ok(())
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not delete the user. Try again later."))
    }

    /// Reactivates a user.
    pub async fn activate_user(&self, id: Uuid) -> AppResult<()> {
        let outcome: AppResult<()> = async {
            self.directory
                .update_role_and_status(id, &AdminUserChanges::active(true))
                .await?;
            self.revocations.clear_flags(id).await?;

            info!(user_id = %id, "User activated");
            Ok(())
        }
        .await;
        outcome.map_err(|e| e.or_internal("Could not activate the user. Try again later."))
    }

    /// Whether the user is active, served from the status cache when possible.
    pub async fn is_user_active(&self, id: Uuid) -> AppResult<bool> {
        self.cached_status(id, StatusFlag::IsActive, |user| user.is_active)
            .await
            .map_err(|e| e.or_internal("Could not verify the user status. Try again later."))
    }

    /// Whether the user is an administrator, served from the status cache
    /// when possible.
    pub async fn is_user_admin(&self, id: Uuid) -> AppResult<bool> {
        self.cached_status(id, StatusFlag::IsAdmin, User::is_admin)
            .await
            .map_err(|e| e.or_internal("Could not verify the user status. Try again later."))
    }

    /// Creates the bootstrap administrator unless an account with its email
    /// already exists. Returns the created user.
    pub async fn ensure_admin(&self, bootstrap: &BootstrapAdminConfig) -> AppResult<Option<User>> {
        let email = bootstrap.email.trim().to_lowercase();
        if self.directory.find_by_email(&email).await?.is_some() {
            info!(email = %email, "Bootstrap administrator already exists");
            return Ok(None);
        }

        self.validator.validate(&bootstrap.password)?;
        let password_hash = self.hasher.hash_password(&bootstrap.password)?;
        let user = self
            .directory
            .insert(&NewUser {
                username: bootstrap.username.clone(),
                email,
                password_hash,
                role: UserRole::Admin,
                is_active: true,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "Bootstrap administrator created");
        Ok(Some(user))
    }

    /// Cache-aside read of a status flag. Only `true` is cached; a `false`
    /// answer removes any stale entry.
    async fn cached_status(
        &self,
        id: Uuid,
        flag: StatusFlag,
        answer: impl Fn(&User) -> bool,
    ) -> AppResult<bool> {
        if self.revocations.get_flag(id, flag).await == Some(true) {
            return Ok(true);
        }

        let user = self
            .directory
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let value = answer(&user);

        let write = if value {
            self.revocations.set_flag(id, flag, true).await
        } else {
            self.revocations.clear_flag(id, flag).await
        };
        if let Err(e) = write {
            warn!(user_id = %id, flag = flag.as_str(), error = %e, "Failed to cache status flag");
        }

        Ok(value)
    }

    /// Validate and hash the password of a profile update, and normalize
    /// the email.
    fn prepare_profile(&self, update: ProfileUpdate) -> AppResult<UserChanges> {
        let password_hash = match update.password {
            Some(password) => {
                self.validator.validate(&password)?;
                Some(self.hasher.hash_password(&password)?)
            }
            None => None,
        };

        Ok(UserChanges {
            email: update.email.map(|e| e.trim().to_lowercase()),
            username: update.username,
            password_hash,
        })
    }
}
