//! # budgetdesk-entity
//!
//! Domain entities shared by every BudgetDesk crate: principals (users)
//! with their roles, and budget-certificate records with their rubros.

pub mod budget;
pub mod user;
