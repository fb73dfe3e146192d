//! Owner identity. Tokens are issued by the account service; this crate only
//! verifies them and turns them into a user id.

mod claims;
pub mod extractors;
pub mod jwt;

pub use claims::{Claims, TokenKind};
pub use extractors::AuthUser;
pub use jwt::JwtKeys;
