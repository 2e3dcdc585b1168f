//! Store traits and their implementations.

pub mod budget;
pub mod memory;
pub mod traits;
pub mod user;

pub use budget::PgBudgetStore;
pub use memory::{MemoryBudgetStore, MemoryUserDirectory};
pub use traits::{BudgetStore, UserDirectory};
pub use user::PgUserDirectory;
