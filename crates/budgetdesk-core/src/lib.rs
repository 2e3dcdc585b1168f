//! # budgetdesk-core
//!
//! Core crate for BudgetDesk. Contains the cache provider trait,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other BudgetDesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
