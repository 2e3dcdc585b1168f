//! Route handlers organized by domain.

pub mod auth;
pub mod budget;
pub mod health;
