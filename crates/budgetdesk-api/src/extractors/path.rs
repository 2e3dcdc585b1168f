//! Typed path parameter helpers.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use budgetdesk_core::error::AppError;

/// Parses a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::bad_request(format!("Invalid user id: {s}")))
}

/// A `{id}` path segment parsed as a UUID, rejected with a JSON 400.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        parse_uuid(&raw).map(IdPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetdesk_core::ErrorKind;

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
        assert_eq!(
            parse_uuid("not-a-uuid").unwrap_err().kind,
            ErrorKind::BadRequest
        );
    }
}
