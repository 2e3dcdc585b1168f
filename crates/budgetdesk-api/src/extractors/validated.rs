//! JSON body extractor that runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use budgetdesk_core::error::AppError;

/// A JSON body that deserialized and passed validation.
///
/// Malformed JSON is a 400; a well-formed body that breaks a rule is a
/// 422 naming the first offending field.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
                AppError::unprocessable(rejection.body_text())
            } else {
                AppError::bad_request(rejection.body_text())
            }
        })?;

        value.validate().map_err(into_app_error)?;
        Ok(Self(value))
    }
}

fn into_app_error(errors: ValidationErrors) -> AppError {
    match first_violation(&errors) {
        Some((field, message)) if field == "__all__" => AppError::unprocessable(message),
        Some((field, message)) => AppError::unprocessable(message).on_field(field),
        None => AppError::unprocessable(errors.to_string()),
    }
}

/// First violation in field-name order, descending into nested structs
/// and lists.
fn first_violation(errors: &ValidationErrors) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let found = match kind {
            ValidationErrorsKind::Field(violations) => violations.first().map(|v| {
                let message = v
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                (field.to_string(), message)
            }),
            ValidationErrorsKind::Struct(inner) => first_violation(inner),
            ValidationErrorsKind::List(items) => items.values().find_map(|inner| first_violation(inner)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}
