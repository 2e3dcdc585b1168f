//! Cache key builders for all BudgetDesk cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use uuid::Uuid;

/// Prefix applied to all BudgetDesk cache keys.
const PREFIX: &str = "budgetdesk";

// ── Token keys ─────────────────────────────────────────────

/// Cache key for a revoked token, addressed by the hex SHA-256 of the token.
pub fn token_blacklist(token_hash: &str) -> String {
    format!("{PREFIX}:blacklist:{token_hash}")
}

// ── User keys ──────────────────────────────────────────────

/// Cache key for a cached boolean status flag of a user
/// (`isActive` or `isAdmin`).
pub fn user_status(user_id: Uuid, flag: &str) -> String {
    format!("{PREFIX}:user:{user_id}:{flag}")
}

// ── Budget keys ────────────────────────────────────────────

/// Cache key for the unfiltered budget record list of an owner.
pub fn budget_list(owner_id: Uuid) -> String {
    format!("{PREFIX}:budget:list:{owner_id}")
}
