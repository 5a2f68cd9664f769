// Session tokens: HS256 JWTs bound to a user id

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sessions last three days from issuance and cannot be revoked earlier.
pub const TOKEN_TTL_DAYS: i64 = 3;

/// Used when no secret is configured. Anyone who knows it can mint tokens.
pub const DEFAULT_JWT_SECRET: &str = "dev_secret_change_me";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Why a presented token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing token")]
    Missing,
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("token signature does not match")]
    BadSignature,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
            _ => AuthError::Malformed,
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::days(TOKEN_TTL_DAYS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign session token")
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue("user-1").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token() {
        let tokens = TokenService::with_ttl("test-secret", Duration::seconds(-30));
        let token = tokens.issue("user-1").unwrap();

        assert_eq!(tokens.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_foreign_secret_is_bad_signature() {
        let ours = TokenService::new("test-secret");
        let theirs = TokenService::new("another-secret");
        let token = theirs.issue("user-1").unwrap();

        assert_eq!(ours.verify(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_swapped_payload_is_bad_signature() {
        let tokens = TokenService::new("test-secret");
        let alice = tokens.issue("alice").unwrap();
        let mallory = tokens.issue("mallory").unwrap();

        let alice_parts: Vec<&str> = alice.split('.').collect();
        let mallory_parts: Vec<&str> = mallory.split('.').collect();
        let forged = format!("{}.{}.{}", alice_parts[0], mallory_parts[1], alice_parts[2]);

        assert_eq!(tokens.verify(&forged), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_foreign_algorithm_is_bad_signature() {
        let tokens = TokenService::new("test-secret");
        let claims = Claims {
            sub: "user-1".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = TokenService::new("test-secret");

        assert_eq!(tokens.verify(""), Err(AuthError::Malformed));
        assert_eq!(tokens.verify("invalid.token.here"), Err(AuthError::Malformed));
        assert_eq!(tokens.verify("no-dots-at-all"), Err(AuthError::Malformed));
    }
}
