//! # budgetdesk-api
//!
//! HTTP API layer for BudgetDesk built on Axum.
//!
//! Provides the auth and budget endpoints, the access middleware that
//! rotates the server token on every authenticated request, cookie
//! transport, extractors, DTOs and CORS.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use state::AppState;
