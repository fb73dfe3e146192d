use std::time::Duration;

use axum::extract::FromRef;
#[cfg(test)]
use jsonwebtoken::{encode, Header};
use jsonwebtoken::{decode, DecodingKey, EncodingKey, Validation};
#[cfg(test)]
use time::OffsetDateTime;
use tracing::debug;
#[cfg(test)]
use uuid::Uuid;

use super::claims::Claims;
#[cfg(test)]
use super::claims::TokenKind;
use crate::{config::JwtConfig, state::AppState};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes.max(0) as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation
    }

    /// Checks signature, expiry, issuer and audience, and that the token is
    /// an access token.
    pub fn verify_access(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation())?;
        debug!(user_id = %data.claims.sub, "access token verified");
        Ok(data.claims)
    }

    /// Signs an access token the way the account service does.
    #[cfg(test)]
    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind: TokenKind::Access,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }
}
