//! # budgetdesk-service
//!
//! Business logic service layer for BudgetDesk. Services follow
//! constructor injection: all dependencies are provided at construction
//! time via `Arc` references.

pub mod budget;
pub mod context;

pub use budget::{BudgetRecordInput, BudgetSequencer};
pub use context::RequestContext;
