//! Bearer token verification.
//!
//! Token issuance (login, refresh) belongs to the identity provider outside
//! this service; `JwtService` verifies the symmetric-key access tokens it
//! produces. The subject claim carries the user id.

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User ID the token was issued for
    pub sub: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct JwtService {
    secret: Vec<u8>,
    algorithm: Algorithm,
    access_ttl_minutes: i64,
}

impl JwtService {
    pub fn new(
        secret: &str,
        algorithm: &str,
        access_ttl_minutes: i64,
    ) -> Result<Self, AuthError> {
        let algorithm = match algorithm {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => return Err(AuthError::UnsupportedAlgorithm(other.to_string())),
        };
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            algorithm,
            access_ttl_minutes,
        })
    }

    /// Issue an access token for a user. Exposed for the identity
    /// collaborator and for tests; request handling only verifies.
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + ChronoDuration::minutes(self.access_ttl_minutes);

        let claims = AccessTokenClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )?;
        Ok(token)
    }

    /// Verify a bearer token and return the user id it was issued for.
    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 30; // seconds, for clock skew

        let data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::new("test-secret-at-least-32-bytes-long!!", "HS256", 15).unwrap();
        let user_id = Uuid::new_v4();
        let token = service.issue_access_token(user_id).unwrap();
        let decoded = service.verify_access_token(&token).unwrap();
        assert_eq!(decoded, user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("secret-one-is-32-bytes-long-enough!!", "HS256", 15).unwrap();
        let verifier = JwtService::new("secret-two-is-32-bytes-long-enough!!", "HS256", 15).unwrap();
        let token = issuer.issue_access_token(Uuid::new_v4()).unwrap();
        assert!(verifier.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_unsupported_algorithm() {
        let err = JwtService::new("secret", "RS256", 15).unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_empty_token_rejected() {
        let service = JwtService::new("test-secret-at-least-32-bytes-long!!", "HS512", 15).unwrap();
        assert!(matches!(
            service.verify_access_token(""),
            Err(AuthError::InvalidToken)
        ));
    }
}
