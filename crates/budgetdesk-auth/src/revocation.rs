//! Token blacklist and cached user status flags.
//!
//! Both live in the shared cache. Blacklist entries are addressed by the
//! SHA-256 of the token so raw tokens never end up in cache keys.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use budgetdesk_cache::keys;
use budgetdesk_cache::provider::CacheManager;
use budgetdesk_core::config::AuthConfig;
use budgetdesk_core::error::AppError;
use budgetdesk_core::result::AppResult;
use budgetdesk_core::traits::CacheProvider;

/// Cached per-user boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    /// Whether the account is active.
    IsActive,
    /// Whether the account has the ADMIN role.
    IsAdmin,
}

impl StatusFlag {
    /// Key segment for this flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsActive => "isActive",
            Self::IsAdmin => "isAdmin",
        }
    }
}

/// Revocation list and status flag cache over a [`CacheManager`].
#[derive(Debug, Clone)]
pub struct RevocationCache {
    cache: Arc<CacheManager>,
    status_ttl: Duration,
}

impl RevocationCache {
    /// Creates the cache facade.
    pub fn new(cache: Arc<CacheManager>, config: &AuthConfig) -> Self {
        Self {
            cache,
            status_ttl: config.status_cache_ttl(),
        }
    }

    fn blacklist_key(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        keys::token_blacklist(&format!("{digest:x}"))
    }

    /// Whether `token` has been revoked. An unreachable cache counts as
    /// "not revoked".
    pub async fn is_revoked(&self, token: &str) -> bool {
        match self.cache.exists(&Self::blacklist_key(token)).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Blacklist lookup failed, treating token as not revoked");
                false
            }
        }
    }

    /// Blacklists `token` for `ttl`. Revoking twice is the same as once.
    pub async fn revoke(&self, token: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .set(&Self::blacklist_key(token), "true", ttl)
            .await
            .map_err(|e| AppError::internal(format!("Failed to revoke token: {e}")))
    }

    /// Cached value of a status flag. Cache failures read as a miss.
    pub async fn get_flag(&self, user_id: Uuid, flag: StatusFlag) -> Option<bool> {
        match self.cache.get(&keys::user_status(user_id, flag.as_str())).await {
            Ok(Some(value)) => value.parse().ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(%user_id, flag = flag.as_str(), error = %e, "Status flag lookup failed");
                None
            }
        }
    }

    /// Caches a status flag for the configured status TTL.
    pub async fn set_flag(&self, user_id: Uuid, flag: StatusFlag, value: bool) -> AppResult<()> {
        self.cache
            .set(
                &keys::user_status(user_id, flag.as_str()),
                if value { "true" } else { "false" },
                self.status_ttl,
            )
            .await
    }

    /// Drops one cached status flag.
    pub async fn clear_flag(&self, user_id: Uuid, flag: StatusFlag) -> AppResult<()> {
        self.cache
            .delete(&keys::user_status(user_id, flag.as_str()))
            .await
    }

    /// Drops both cached status flags.
    pub async fn clear_flags(&self, user_id: Uuid) -> AppResult<()> {
        self.clear_flag(user_id, StatusFlag::IsActive).await?;
        self.clear_flag(user_id, StatusFlag::IsAdmin).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use budgetdesk_core::ErrorKind;

    fn revocations() -> RevocationCache {
        RevocationCache::new(
            Arc::new(CacheManager::in_memory()),
            &AuthConfig::with_secret("s"),
        )
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let cache = revocations();
        assert!(!cache.is_revoked("tok").await);

        cache.revoke("tok", Duration::from_secs(60)).await.unwrap();
        cache.revoke("tok", Duration::from_secs(60)).await.unwrap();

        assert!(cache.is_revoked("tok").await);
        assert!(!cache.is_revoked("other").await);
    }

    #[tokio::test]
    async fn test_flags_roundtrip_and_clear() {
        let cache = revocations();
        let id = Uuid::new_v4();

        assert_eq!(cache.get_flag(id, StatusFlag::IsActive).await, None);
        cache.set_flag(id, StatusFlag::IsActive, true).await.unwrap();
        cache.set_flag(id, StatusFlag::IsAdmin, false).await.unwrap();
        assert_eq!(cache.get_flag(id, StatusFlag::IsActive).await, Some(true));
        assert_eq!(cache.get_flag(id, StatusFlag::IsAdmin).await, Some(false));

        cache.clear_flags(id).await.unwrap();
        assert_eq!(cache.get_flag(id, StatusFlag::IsActive).await, None);
        assert_eq!(cache.get_flag(id, StatusFlag::IsAdmin).await, None);
    }

    #[test]
    fn test_blacklist_key_hides_token() {
        let key = RevocationCache::blacklist_key("secret.token.value");
        assert!(key.starts_with("budgetdesk:blacklist:"));
        assert!(!key.contains("secret"));
        assert_eq!(key.len(), "budgetdesk:blacklist:".len() + 64);
    }

    #[derive(Debug)]
    struct UnreachableCache;

    #[async_trait]
    impl CacheProvider for UnreachableCache {
        async fn get(&self, _: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("connection refused"))
        }

        async fn set(&self, _: &str, _: &str, _: Duration) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }

        async fn delete(&self, _: &str) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }

        async fn exists(&self, _: &str) -> AppResult<bool> {
            Err(AppError::cache("connection refused"))
        }

        async fn health_check(&self) -> AppResult<bool> {
            Err(AppError::cache("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_unreachable_cache_reads_as_miss() {
        let cache = RevocationCache::new(
            Arc::new(CacheManager::from_provider(
                Arc::new(UnreachableCache),
                Duration::from_secs(60),
            )),
            &AuthConfig::with_secret("s"),
        );
        let id = Uuid::new_v4();

        assert!(!cache.is_revoked("tok").await);
        assert_eq!(cache.get_flag(id, StatusFlag::IsActive).await, None);
        assert_eq!(cache.get_flag(id, StatusFlag::IsAdmin).await, None);

        let err = cache.revoke("tok", Duration::from_secs(60)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(cache.set_flag(id, StatusFlag::IsActive, true).await.is_err());
    }
}
