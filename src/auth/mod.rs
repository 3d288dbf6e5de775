use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SERVICES_READ: &str = "services:read";
pub const SERVICES_WRITE: &str = "services:write";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub activated: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, activated: bool, permissions: Vec<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            activated,
            permissions,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("invalid or expired authentication token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// Sign `claims` with HS256. Used by tests and tooling; the API itself
/// only verifies tokens.
pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trips_claims() {
        let claims = Claims::new(7, true, vec![SERVICES_READ.into()], Duration::hours(1));
        let token = generate_jwt(&claims, SECRET).unwrap();
        let decoded = validate_jwt(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, 7);
        assert!(decoded.activated);
        assert_eq!(decoded.permissions, vec![SERVICES_READ.to_string()]);
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let claims = Claims::new(7, true, vec![], Duration::hours(1));
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(matches!(validate_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));

        let expired = Claims::new(7, true, vec![], Duration::hours(-2));
        let token = generate_jwt(&expired, SECRET).unwrap();
        assert!(matches!(validate_jwt(&token, SECRET), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn requires_secret() {
        let claims = Claims::new(1, true, vec![], Duration::hours(1));
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
        assert!(matches!(validate_jwt("x.y.z", ""), Err(JwtError::InvalidSecret)));
    }
}
