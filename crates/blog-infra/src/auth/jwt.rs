//! JWT bearer token validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

use blog_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT validation configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String, // user_id
    exp: i64,
}

/// Validates HS256 tokens issued by the sign-in service.
pub struct JwtTokenService {
    decoding_key: DecodingKey,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self::new(JwtConfig { secret })
    }
}

impl TokenService for JwtTokenService {
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        if token_data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(TokenClaims {
            user_id: token_data.claims.sub,
            exp: token_data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
    }

    fn token(secret: &str, sub: &str, exp: i64) -> String {
        encode(
            &Header::default(),
            &TestClaims { sub, exp },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn service() -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
        })
    }

    #[test]
    fn test_validate_token_success() {
        let exp = (Utc::now() + TimeDelta::hours(1)).timestamp();
        let claims = service()
            .validate_token(&token("test-secret-key", "user-1", exp))
            .unwrap();

        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn test_validate_invalid_token() {
        let result = service().validate_token("invalid-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_validate_wrong_secret() {
        let exp = (Utc::now() + TimeDelta::hours(1)).timestamp();
        let result = service().validate_token(&token("other-secret", "user-1", exp));
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let exp = (Utc::now() - TimeDelta::hours(2)).timestamp();
        let result = service().validate_token(&token("test-secret-key", "user-1", exp));
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }
}
