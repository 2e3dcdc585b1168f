//! PostgreSQL user directory.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use budgetdesk_core::error::{AppError, ErrorKind};
use budgetdesk_core::result::AppResult;
use budgetdesk_entity::user::{AdminUserChanges, NewUser, User, UserChanges};

use super::traits::UserDirectory;

/// [`UserDirectory`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new user directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Map a write error, turning unique violations into field conflicts.
    fn map_write_err(e: sqlx::Error, context: &str) -> AppError {
        match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
                AppError::conflict("Email already in use").on_field("email")
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_username_key") =>
            {
                AppError::conflict("Username already in use").on_field("username")
            }
            _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
        }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn insert(&self, user: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash, role, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_err(e, "Failed to create user"))
    }

    async fn update_partial(&self, id: Uuid, changes: &UserChanges) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($2, email), \
                              username = COALESCE($3, username), \
                              password_hash = COALESCE($4, password_hash), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.username)
        .bind(&changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_err(e, "Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn update_role_and_status(
        &self,
        id: Uuid,
        changes: &AdminUserChanges,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($2, email), \
                              username = COALESCE($3, username), \
                              password_hash = COALESCE($4, password_hash), \
                              role = COALESCE($5, role), \
                              is_active = COALESCE($6, is_active), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.profile.email)
        .bind(&changes.profile.username)
        .bind(&changes.profile.password_hash)
        .bind(changes.role)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_err(e, "Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }
}
