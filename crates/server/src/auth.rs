//! JWT issuance and verification for the bearer tokens of the API.
//!
//! Tokens are HS256 JWTs signed with the configured secret. An access token
//! authenticates requests; a refresh token can only be traded for a new
//! access token.

use axum::http::StatusCode;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use api_types::auth::TokenPair;

const DEFAULT_ISSUER: &str = "globetrotter";
const DEFAULT_ACCESS_LIFETIME_SECS: u64 = 15 * 60;
const DEFAULT_REFRESH_LIFETIME_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided")]
    MissingToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token is invalid: {0}")]
    TokenInvalid(String),
    #[error("Expected a {expected} token")]
    WrongTokenType { expected: TokenType },
    #[error("Token signing failed: {0}")]
    Crypto(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: TokenType,
}

/// Signing secret and token lifetimes.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_lifetime_secs: u64,
    pub refresh_token_lifetime_secs: u64,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            access_token_lifetime_secs: DEFAULT_ACCESS_LIFETIME_SECS,
            refresh_token_lifetime_secs: DEFAULT_REFRESH_LIFETIME_SECS,
        }
    }

    fn lifetime(&self, token_type: TokenType) -> i64 {
        let secs = match token_type {
            TokenType::Access => self.access_token_lifetime_secs,
            TokenType::Refresh => self.refresh_token_lifetime_secs,
        };
        i64::try_from(secs).unwrap_or(i64::MAX)
    }

    pub fn issue(&self, user_id: &str, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.lifetime(token_type)),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };
        let key = EncodingKey::from_secret(self.jwt_secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| AuthError::Crypto(e.to_string()))
    }

    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    /// Verify signature, issuer and expiry, then check the token type.
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let claims = jsonwebtoken::decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })?;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType { expected });
        }
        Ok(claims)
    }
}
