//! Session lifecycle: credentials, the dual-token contract and user
//! administration.

pub mod authority;
pub mod types;

pub use authority::SessionAuthority;
pub use types::{
    AdminProfileUpdate, Credentials, Principal, ProfileUpdate, Registration, RotatedTokens,
};
