//! Key-value cache seam shared by the revocation list, the status flags
//! and the budget list cache.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A string key-value store with per-entry expiry (moka or Redis).
///
/// Structured values go through the JSON helpers.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Value stored under `key`, or `None` once it is missing or expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key` for `ttl`, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Remove `key`. A missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Whether `key` is present.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Read and deserialize a JSON value.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON and store it for `ttl`.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw, ttl).await
    }

    /// Whether the backend answers.
    async fn health_check(&self) -> AppResult<bool>;
}
