//! Authentication utilities
//!
//! Provides:
//! - Supabase access token validation (HS256)
//! - Axum extractors for required and optional users

use crate::errors::{AppError, Result};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// The signed-in user a request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Claims carried by a Supabase access token
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Audience, `authenticated` for signed-in users
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Access token validator
pub struct JwtManager {
    keys: Option<(EncodingKey, DecodingKey)>,
    audience: String,
}

impl JwtManager {
    /// `secret` is the project's JWT secret; without one every token is refused
    pub fn new(secret: Option<&str>, audience: &str) -> Self {
        let keys = secret.filter(|s| !s.is_empty()).map(|s| {
            (
                EncodingKey::from_secret(s.as_bytes()),
                DecodingKey::from_secret(s.as_bytes()),
            )
        });

        Self {
            keys,
            audience: audience.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    /// Sign a token for `user_id`, used by local tooling and tests
    pub fn generate_token(&self, user_id: Uuid, email: Option<&str>, ttl: Duration) -> Result<String> {
        let (encoding_key, _) = self.keys.as_ref().ok_or_else(not_configured)?;
        let now = Utc::now();

        let claims = JwtClaims {
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            email: email.map(String::from),
            role: Some("authenticated".to_string()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to generate token: {}", e),
        })
    }

    /// Validate signature, expiry and audience
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        let (_, decoding_key) = self.keys.as_ref().ok_or_else(not_configured)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        decode::<JwtClaims>(token, decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }

    /// Validated token to user
    pub fn authenticate(&self, token: &str) -> Result<AuthUser> {
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}

fn not_configured() -> AppError {
    AppError::Unauthorized {
        message: "Authentication is not configured".to_string(),
    }
}

/// Extract the token from an Authorization header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer)
}

/// Axum extractor for a required user
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let token = bearer_token(parts).ok_or_else(|| AppError::Unauthorized {
            message: "Missing bearer token".to_string(),
        })?;

        let jwt = Arc::<JwtManager>::from_ref(state);
        jwt.authenticate(token)
    }
}

/// The user when a valid token is present; guests and bad tokens give `None`
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };

        let jwt = Arc::<JwtManager>::from_ref(state);
        match jwt.authenticate(token) {
            Ok(user) => Ok(Self(Some(user))),
            Err(e) => {
                debug!(error = %e, "Ignoring unusable token on optional route");
                Ok(Self(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn manager() -> JwtManager {
        JwtManager::new(Some("test_secret"), "authenticated")
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("abc.def"), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_jwt_roundtrip() {
        let jwt = manager();
        let user_id = Uuid::new_v4();

        let token = jwt
            .generate_token(user_id, Some("ada@example.com"), Duration::hours(1))
            .unwrap();
        let user = jwt.authenticate(&token).unwrap();

        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_rejections() {
        let jwt = manager();
        let user_id = Uuid::new_v4();

        let expired = jwt.generate_token(user_id, None, Duration::hours(-2)).unwrap();
        assert!(matches!(jwt.authenticate(&expired), Err(AppError::ExpiredToken)));

        let other_audience = JwtManager::new(Some("test_secret"), "anon")
            .generate_token(user_id, None, Duration::hours(1))
            .unwrap();
        assert!(matches!(jwt.authenticate(&other_audience), Err(AppError::InvalidToken)));

        let other_secret = JwtManager::new(Some("another_secret"), "authenticated")
            .generate_token(user_id, None, Duration::hours(1))
            .unwrap();
        assert!(matches!(jwt.authenticate(&other_secret), Err(AppError::InvalidToken)));

        let unconfigured = JwtManager::new(None, "authenticated");
        assert!(!unconfigured.is_configured());
        assert!(matches!(
            unconfigured.authenticate("a.b.c"),
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_extractors() {
        let state = Arc::new(manager());
        let user_id = Uuid::new_v4();
        let token = state.generate_token(user_id, None, Duration::hours(1)).unwrap();

        let (mut parts, _) = Request::builder()
            .header("authorization", format!("Bearer {}", token))
            .body(())
            .unwrap()
            .into_parts();
        let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, user_id);

        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(AuthUser::from_request_parts(&mut parts, &state).await.is_err());
        let guest = OptionalAuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(guest.0.is_none());

        let (mut parts, _) = Request::builder()
            .header("authorization", "Bearer not-a-token")
            .body(())
            .unwrap()
            .into_parts();
        let guest = OptionalAuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(guest.0.is_none());
    }
}
