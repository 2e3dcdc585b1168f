//! In-process stores used when no database URL is configured, and in tests.
//!
//! Each store keeps its rows behind a single `tokio::sync::RwLock`, so the
//! uniqueness check and the insert happen under one write guard.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use budgetdesk_core::error::AppError;
use budgetdesk_core::result::AppResult;
use budgetdesk_entity::budget::{BudgetRecord, NewBudgetRecord};
use budgetdesk_entity::user::{AdminUserChanges, NewUser, User, UserChanges};

use super::traits::{BudgetStore, UserDirectory};

/// [`UserDirectory`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with a field conflict if another user already holds `email`
    /// or `username`.
    fn ensure_unique(
        users: &HashMap<Uuid, User>,
        except: Option<Uuid>,
        email: Option<&str>,
        username: Option<&str>,
    ) -> AppResult<()> {
        let others = || users.values().filter(move |u| Some(u.id) != except);

        if let Some(email) = email {
            if others().any(|u| u.email.eq_ignore_ascii_case(email)) {
                return Err(AppError::conflict("Email already in use").on_field("email"));
            }
        }
        if let Some(username) = username {
            if others().any(|u| u.username.eq_ignore_ascii_case(username)) {
                return Err(AppError::conflict("Username already in use").on_field("username"));
            }
        }
        Ok(())
    }

    fn apply_profile(user: &mut User, changes: &UserChanges) {
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(hash) = &changes.password_hash {
            user.password_hash = hash.clone();
        }
        user.updated_at = Utc::now();
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: &NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        Self::ensure_unique(&users, None, Some(&user.email), Some(&user.username))?;

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_partial(&self, id: Uuid, changes: &UserChanges) -> AppResult<User> {
        let mut users = self.users.write().await;
        Self::ensure_unique(
            &users,
            Some(id),
            changes.email.as_deref(),
            changes.username.as_deref(),
        )?;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        Self::apply_profile(user, changes);
        Ok(user.clone())
    }

    async fn update_role_and_status(
        &self,
        id: Uuid,
        changes: &AdminUserChanges,
    ) -> AppResult<User> {
        let mut users = self.users.write().await;
        Self::ensure_unique(
            &users,
            Some(id),
            changes.profile.email.as_deref(),
            changes.profile.username.as_deref(),
        )?;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        Self::apply_profile(user, &changes.profile);
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        Ok(user.clone())
    }
}

/// [`BudgetStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryBudgetStore {
    records: RwLock<Vec<BudgetRecord>>,
}

impl MemoryBudgetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BudgetStore for MemoryBudgetStore {
    async fn find_by_certificate(
        &self,
        owner_id: Uuid,
        certificate_number: &str,
    ) -> AppResult<Option<BudgetRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.created_by == owner_id && r.certificate_number == certificate_number)
            .cloned())
    }

    async fn find_all(&self, owner_id: Uuid) -> AppResult<Vec<BudgetRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.created_by == owner_id)
            .cloned()
            .collect())
    }

    async fn find_all_by_certificate_prefix(
        &self,
        owner_id: Uuid,
        prefix: &str,
    ) -> AppResult<Vec<BudgetRecord>> {
        let prefix = prefix.to_lowercase();
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| {
                r.created_by == owner_id && r.certificate_number.to_lowercase().starts_with(&prefix)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, record: &NewBudgetRecord, owner_id: Uuid) -> AppResult<BudgetRecord> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.created_by == owner_id && r.certificate_number == record.certificate_number)
        {
            return Err(AppError::conflict(format!(
                "Certificate number {} already exists",
                record.certificate_number
            ))
            .on_field("certificateNumber"));
        }

        let created = record.clone().into_record(owner_id);
        records.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetdesk_core::ErrorKind;
    use budgetdesk_entity::user::UserRole;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::User,
            is_active: true,
        }
    }

    fn new_record(certificate: &str) -> NewBudgetRecord {
        NewBudgetRecord {
            certificate_number: certificate.to_string(),
            issuance_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            total_assigned_amount: Decimal::new(1000, 0),
            rubros: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email_case_insensitively() {
        let dir = MemoryUserDirectory::new();
        dir.insert(&new_user("alice1", "alice@example.com"))
            .await
            .unwrap();

        let err = dir
            .insert(&new_user("alice2", "ALICE@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.field.as_deref(), Some("email"));
    }

    #[tokio::test]
    async fn test_update_rejects_username_taken_by_other_user() {
        let dir = MemoryUserDirectory::new();
        dir.insert(&new_user("carlos", "carlos@example.com"))
            .await
            .unwrap();
        let other = dir
            .insert(&new_user("daniela", "daniela@example.com"))
            .await
            .unwrap();

        let changes = UserChanges {
            username: Some("Carlos".to_string()),
            ..UserChanges::default()
        };
        let err = dir.update_partial(other.id, &changes).await.unwrap_err();
        assert_eq!(err.field.as_deref(), Some("username"));

        // Renaming to one's own name is not a conflict.
        let own = UserChanges {
            username: Some("Daniela".to_string()),
            ..UserChanges::default()
        };
        let updated = dir.update_partial(other.id, &own).await.unwrap();
        assert_eq!(updated.username, "Daniela");
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let dir = MemoryUserDirectory::new();
        let err = dir
            .update_role_and_status(Uuid::new_v4(), &AdminUserChanges::active(false))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_budget_records_are_scoped_by_owner() {
        let store = MemoryBudgetStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.insert(&new_record("10"), owner).await.unwrap();
        store.insert(&new_record("10"), other).await.unwrap();
        store.insert(&new_record("11"), owner).await.unwrap();

        assert_eq!(store.find_all(owner).await.unwrap().len(), 2);
        assert!(store.find_by_certificate(other, "11").await.unwrap().is_none());

        let err = store.insert(&new_record("11"), owner).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_prefix_search() {
        let store = MemoryBudgetStore::new();
        let owner = Uuid::new_v4();
        for cert in ["100", "101", "20"] {
            store.insert(&new_record(cert), owner).await.unwrap();
        }

        let found = store
            .find_all_by_certificate_prefix(owner, "10")
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }
}
