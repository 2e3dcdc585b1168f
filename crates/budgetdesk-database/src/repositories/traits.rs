//! Store abstractions the services are written against.

use async_trait::async_trait;
use uuid::Uuid;

use budgetdesk_core::result::AppResult;
use budgetdesk_entity::budget::{BudgetRecord, NewBudgetRecord};
use budgetdesk_entity::user::{AdminUserChanges, NewUser, User, UserChanges};

/// Persistent registry of principals.
///
/// Lookups by email and username are case-insensitive. Writes that would
/// collide with another account fail with `Conflict`, carrying the
/// colliding field (`email` or `username`) in `AppError::field`.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Persist a new user.
    async fn insert(&self, user: &NewUser) -> AppResult<User>;

    /// Apply a profile update. `NotFound` if the user does not exist.
    async fn update_partial(&self, id: Uuid, changes: &UserChanges) -> AppResult<User>;

    /// Apply an administrative update, including role and active flag.
    /// `NotFound` if the user does not exist.
    async fn update_role_and_status(&self, id: Uuid, changes: &AdminUserChanges)
    -> AppResult<User>;
}

/// Persistent store of budget records, partitioned by owner.
#[async_trait]
pub trait BudgetStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find the owner's record with exactly this certificate number.
    async fn find_by_certificate(
        &self,
        owner_id: Uuid,
        certificate_number: &str,
    ) -> AppResult<Option<BudgetRecord>>;

    /// All records of the owner. No ordering is guaranteed.
    async fn find_all(&self, owner_id: Uuid) -> AppResult<Vec<BudgetRecord>>;

    /// Records of the owner whose certificate number starts with `prefix`,
    /// compared case-insensitively.
    async fn find_all_by_certificate_prefix(
        &self,
        owner_id: Uuid,
        prefix: &str,
    ) -> AppResult<Vec<BudgetRecord>>;

    /// Persist a record for the owner. `Conflict` on a duplicate
    /// certificate number.
    async fn insert(&self, record: &NewBudgetRecord, owner_id: Uuid) -> AppResult<BudgetRecord>;
}
