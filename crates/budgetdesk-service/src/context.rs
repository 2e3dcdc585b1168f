//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Built by the access middleware and passed into handlers and services
/// so that every operation knows *who* is acting.
#[derive(Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The username from the token claims.
    pub username: String,
    /// The server token issued for this request, replacing the one the
    /// client presented.
    pub server_token: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, username: String, server_token: String) -> Self {
        Self {
            user_id,
            username,
            server_token,
            request_time: Utc::now(),
        }
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("request_time", &self.request_time)
            .finish_non_exhaustive()
    }
}
