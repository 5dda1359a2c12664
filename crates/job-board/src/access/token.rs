use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::board::domain::{Role, User};
use crate::config::AuthConfig;

/// Signed bearer token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub is_super_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("unable to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies HS256 tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::hours(i64::from(config.token_ttl_hours)),
        )
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            is_super_admin: user.is_super_admin,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(err.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::domain::UserId;

    fn user() -> User {
        User {
            id: UserId::from("user-00000042"),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            phone: "5550142".to_string(),
            password_hash: String::new(),
            role: Role::Employer,
            is_super_admin: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_tokens_round_trip_claims() {
        let issuer = TokenIssuer::new("secret", Duration::hours(24));
        let token = issuer.issue(&user()).expect("signs");
        let claims = issuer.verify(&token).expect("verifies");
        assert_eq!(claims.sub, "user-00000042");
        assert_eq!(claims.role, Role::Employer);
        assert!(!claims.is_super_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let token = TokenIssuer::new("secret-a", Duration::hours(1))
            .issue(&user())
            .expect("signs");
        let err = TokenIssuer::new("secret-b", Duration::hours(1))
            .verify(&token)
            .expect_err("signature mismatch");
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn reports_expired_tokens() {
        let issuer = TokenIssuer::new("secret", Duration::hours(1));
        let token = issuer
            .issue_at(&user(), Utc::now() - Duration::hours(3))
            .expect("signs");
        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn oversized_lifetime_is_a_signing_error() {
        let issuer = TokenIssuer::new("secret", Duration::hours(i64::from(u32::MAX)));
        match issuer.issue(&user()) {
            Err(TokenError::Signing(message)) => assert!(message.contains("out of range")),
            other => panic!("expected signing error, got {other:?}"),
        }
    }
}
