//! User domain entities.

pub mod model;
pub mod role;

pub use model::{AdminUserChanges, NewUser, User, UserChanges};
pub use role::UserRole;
