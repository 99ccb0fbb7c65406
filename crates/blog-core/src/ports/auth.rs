//! Authentication port. Tokens are issued elsewhere; this service only checks them.

/// Claims carried by a bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: String,
    pub exp: i64,
}

/// Token validation for request authentication.
pub trait TokenService: Send + Sync {
    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
