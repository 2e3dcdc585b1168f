//! # budgetdesk-auth
//!
//! Authentication and authorization for BudgetDesk.
//!
//! ## Modules
//!
//! - `jwt` — HS256 token signing, verification and the client/server token pair
//! - `revocation` — token blacklist and cached user status flags
//! - `password` — Argon2id password hashing and policy enforcement
//! - `session` — registration, login, logout, token refresh and user administration
//! - `guard` — per-request access check with server token rotation

pub mod guard;
pub mod jwt;
pub mod password;
pub mod revocation;
pub mod session;

pub use guard::{AccessDenied, AccessGranted, AccessGuard, AccessLevel};
pub use jwt::{Claims, IssuedToken, TokenCodec, TokenPair, TokenPayload};
pub use password::{PasswordHasher, PasswordValidator};
pub use revocation::{RevocationCache, StatusFlag};
pub use session::{
    AdminProfileUpdate, Credentials, Principal, ProfileUpdate, Registration, RotatedTokens,
    SessionAuthority,
};
