use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token kind carried in the `kind` claim. The account service also issues
/// refresh tokens; their kind fails to deserialize, so they never reach a
/// handler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
}

/// Access-token payload. `sub` is the plan owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}
