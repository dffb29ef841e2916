use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Which credential table a token was minted against. User and admin tokens
/// are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    User,
    Admin,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub scope: TokenScope,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, scope: TokenScope) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            scope,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Generate a token using the configured secret and expiry.
pub fn issue_token(sub: Uuid, scope: TokenScope) -> Result<String, JwtError> {
    let claims = Claims::new(sub, scope);
    generate_token(&claims, &config::config().security.jwt_secret)
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trip_preserves_claims() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, TokenScope::User);
        let token = generate_token(&claims, SECRET).unwrap();

        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.scope, TokenScope::User);
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), TokenScope::Admin);
        let token = generate_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), TokenScope::User);
        assert!(matches!(
            generate_token(&claims, ""),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn password_verify_matches_hash() {
        // Low cost keeps the test fast; production cost comes from config
        let hash = bcrypt::hash("s3cret-password", 4).unwrap();
        assert!(verify_password("s3cret-password", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }
}
