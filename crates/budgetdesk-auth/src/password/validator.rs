//! Password policy enforcement for new passwords.

use budgetdesk_core::error::AppError;

/// Minimum password length, in characters.
const MIN_LENGTH: usize = 8;
/// Maximum password length, in characters.
const MAX_LENGTH: usize = 20;
/// Characters that satisfy the special-character rule.
const SPECIAL_CHARACTERS: &str = "$@!%*?&";

/// Validates new passwords against the account password policy.
#[derive(Debug, Clone, Default)]
pub struct PasswordValidator;

impl PasswordValidator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates a password against the policy.
    ///
    /// Returns `Ok(())` if the password meets all requirements, or an
    /// `UnprocessableEntity` error describing the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let length = password.chars().count();
        if length < MIN_LENGTH {
            return Err(AppError::unprocessable(format!(
                "Password must be at least {MIN_LENGTH} characters long"
            )));
        }
        if length > MAX_LENGTH {
            return Err(AppError::unprocessable(format!(
                "Password must be at most {MAX_LENGTH} characters long"
            )));
        }

        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AppError::unprocessable(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(AppError::unprocessable(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::unprocessable(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Err(AppError::unprocessable(format!(
                "Password must contain at least one special character ({SPECIAL_CHARACTERS})"
            )));
        }

        Ok(())
    }
}
