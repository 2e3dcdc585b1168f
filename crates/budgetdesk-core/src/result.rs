//! Convenience result type alias for BudgetDesk.

use crate::error::AppError;

/// A specialized `Result` type for BudgetDesk operations.
pub type AppResult<T> = Result<T, AppError>;
