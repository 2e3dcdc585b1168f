//! `AuthUser` extractor: the caller admitted by the access middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use budgetdesk_core::error::AppError;
use budgetdesk_service::context::RequestContext;

/// Extracted authenticated user context available in handlers.
///
/// Only resolves on routes behind
/// [`require_authenticated`](crate::middleware::access::require_authenticated)
/// or [`require_admin`](crate::middleware::access::require_admin).
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized("User is not authenticated"))
    }
}
