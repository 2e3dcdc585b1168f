//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use budgetdesk_auth::{
    AccessGuard, PasswordHasher, PasswordValidator, RevocationCache, SessionAuthority, TokenCodec,
};
use budgetdesk_cache::provider::CacheManager;
use budgetdesk_core::config::AppConfig;
use budgetdesk_core::result::AppResult;
use budgetdesk_database::repositories::{BudgetStore, UserDirectory};
use budgetdesk_service::BudgetSequencer;

use crate::cookies::CookieSettings;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session cookie attributes
    pub cookies: Arc<CookieSettings>,

    // ── Infrastructure ───────────────────────────────────────
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token signing and verification
    pub codec: Arc<TokenCodec>,
    /// Account and token lifecycle
    pub authority: Arc<SessionAuthority>,
    /// Per-request access check and token rotation
    pub guard: Arc<AccessGuard>,

    // ── Services ─────────────────────────────────────────────
    /// Budget certificate service
    pub sequencer: Arc<BudgetSequencer>,
}

impl AppState {
    /// Wires the auth and budget components on top of the given
    /// collaborators.
    pub fn new(
        config: AppConfig,
        cache: Arc<CacheManager>,
        directory: Arc<dyn UserDirectory>,
        store: Arc<dyn BudgetStore>,
    ) -> AppResult<Self> {
        let codec = Arc::new(TokenCodec::new(&config.auth)?);
        let revocations = Arc::new(RevocationCache::new(Arc::clone(&cache), &config.auth));
        let authority = Arc::new(SessionAuthority::new(
            Arc::clone(&codec),
            Arc::clone(&revocations),
            directory,
            Arc::new(PasswordHasher::new()),
            Arc::new(PasswordValidator::new()),
            &config.auth,
        ));
        let guard = Arc::new(AccessGuard::new(
            Arc::clone(&authority),
            revocations,
            Arc::clone(&codec),
        ));
        let sequencer = Arc::new(BudgetSequencer::new(store, Arc::clone(&cache)));
        let cookies = Arc::new(CookieSettings::new(&config));

        Ok(Self {
            config: Arc::new(config),
            cookies,
            cache,
            codec,
            authority,
            guard,
            sequencer,
        })
    }
}
