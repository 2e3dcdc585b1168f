//! Budget-certificate domain entities.

pub mod model;

pub use model::{BudgetRecord, NewBudgetRecord, Rubro};
