//! # budgetdesk-database
//!
//! PostgreSQL connection management, the store traits the services depend
//! on ([`UserDirectory`], [`BudgetStore`]), and their Postgres and
//! in-memory implementations.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{
    BudgetStore, MemoryBudgetStore, MemoryUserDirectory, PgBudgetStore, PgUserDirectory,
    UserDirectory,
};
