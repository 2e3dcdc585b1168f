//! Core traits defined in `budgetdesk-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
