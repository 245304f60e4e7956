pub mod claims;
pub mod password;
pub mod tokens;

pub use claims::Claims;
pub use tokens::{TokenIssuer, VerifiedToken};
