//! Long-lived credential tokens handed out on register and login.

use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub trait TokenIssuer: Send + Sync {
    fn long_token(&self, user_id: &str, user_key: &str) -> Result<String, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTokenClaims {
    pub user_id: String,
    pub user_key: String,
    pub iat: i64,
    pub exp: i64,
}

/// Longest accepted token lifetime, in days.
pub const MAX_TTL_DAYS: i64 = 36_500;

/// HS256 issuer keyed by `LONG_TOKEN_SECRET`.
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtIssuer {
    /// `ttl_days` is clamped to `1..=MAX_TTL_DAYS`.
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        JwtIssuer {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days.clamp(1, MAX_TTL_DAYS)),
        }
    }

    pub fn verify(&self, token: &str) -> Result<LongTokenClaims, AppError> {
        let data = jsonwebtoken::decode::<LongTokenClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn long_token(&self, user_id: &str, user_key: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = LongTokenClaims {
            user_id: user_id.to_string(),
            user_key: user_key.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let issuer = JwtIssuer::new("test-secret", 30);
        let token = issuer.long_token("u-1", "k-1").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.user_key, "k-1");
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtIssuer::new("a", 1).long_token("u", "k").unwrap();
        assert!(JwtIssuer::new("b", 1).verify(&token).is_err());
    }

    #[test]
    fn out_of_range_ttl_is_clamped() {
        let long = JwtIssuer::new("s", i64::MAX);
        let claims = long.verify(&long.long_token("u", "k").unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TTL_DAYS * 24 * 60 * 60);

        let short = JwtIssuer::new("s", -5);
        let claims = short.verify(&short.long_token("u", "k").unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }
}
