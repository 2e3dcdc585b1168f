//! JWT token handling.

pub mod claims;
pub mod codec;

pub use claims::{Claims, TokenPayload};
pub use codec::{IssuedToken, TokenCodec, TokenPair};
