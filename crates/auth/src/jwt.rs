//! JWT access tokens.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // user public id
    pub role: String, // user role at issue time
    pub exp: usize,
    pub iat: usize,
    pub nbf: usize,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

/// Signs and validates HS256 access tokens
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    token_duration: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, issuer: String, audience: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            token_duration: Duration::from_secs(15 * 60),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    pub fn token_duration(&self) -> Duration {
        self.token_duration
    }

    /// Issue a token for `user_id` (a public id)
    pub fn generate_token(&self, user_id: &str, role: &str) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::TokenCreation("system time before unix epoch".to_string()))?;
        let exp = now + self.token_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: exp.as_secs() as usize,
            iat: now.as_secs() as usize,
            nbf: now.as_secs() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::TokenCreation(err.to_string()))
    }

    /// Check signature, issuer, audience and expiry
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_nbf = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new(
            "test_secret_key_that_is_long_enough_for_hs256",
            "test_issuer".to_string(),
            "test_audience".to_string(),
        )
    }

    #[test]
    fn test_token_generation_and_validation() {
        let jwt = manager();
        let token = jwt.generate_token("user_123", "customer").unwrap();
        assert!(!token.is_empty());

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.role, "customer");
        assert_eq!(claims.iss, "test_issuer");
        assert_eq!(claims.aud, "test_audience");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_tokens_have_unique_ids() {
        let jwt = manager();
        let first = jwt.validate_token(&jwt.generate_token("u", "customer").unwrap()).unwrap();
        let second = jwt.validate_token(&jwt.generate_token("u", "customer").unwrap()).unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            manager().validate_token("invalid.jwt.token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_audience_or_secret_is_rejected() {
        let token = manager().generate_token("user_123", "admin").unwrap();

        let other_audience = JwtManager::new(
            "test_secret_key_that_is_long_enough_for_hs256",
            "test_issuer".to_string(),
            "someone_else".to_string(),
        );
        assert!(other_audience.validate_token(&token).is_err());

        let other_secret = JwtManager::new(
            "a_completely_different_secret_value",
            "test_issuer".to_string(),
            "test_audience".to_string(),
        );
        assert!(other_secret.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = manager();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as usize;
        let claims = Claims {
            sub: "user_123".to_string(),
            role: "customer".to_string(),
            exp: now - 3600,
            iat: now - 7200,
            nbf: now - 7200,
            iss: "test_issuer".to_string(),
            aud: "test_audience".to_string(),
            jti: "expired".to_string(),
        };
        let token = encode(&Header::default(), &claims, &jwt.encoding_key).unwrap();
        assert!(jwt.validate_token(&token).is_err());
    }
}
