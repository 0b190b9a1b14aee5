// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::db::collections;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie name (checked before the Authorization header).
pub const SESSION_COOKIE: &str = "food_token";

/// Session lifetime in seconds.
pub const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user attached to each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub is_admin: bool,
}

impl AuthUser {
    /// Whether this caller owns `owner_id` or is an admin.
    pub fn can_access(&self, owner_id: &str) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

/// Middleware that requires valid JWT authentication.
///
/// The admin flag is read from the stored user on every request, so
/// revoking admin rights or deleting the account takes effect immediately.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.to_string(),
            None => {
                return Err(AppError::Unauthorized(
                    "Not authorized, no token".to_string(),
                ))
            }
        }
    };

    let claims = verify_jwt(&token, &state.config.jwt_signing_key)?;

    let user: User = state
        .db
        .get(collections::USERS, &claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "Token for deleted user");
            AppError::InvalidToken
        })?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        is_admin: user.is_admin,
    });

    Ok(next.run(request).await)
}

/// Middleware that rejects non-admins. Must run after [`require_auth`].
pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin {
        tracing::warn!(user_id = %user.user_id, "Admin route denied");
        return Err(AppError::Unauthorized(
            "Not authorized as an admin".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

/// Decode and validate a session token.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

/// Create a JWT for a user session.
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let key = b"test_signing_key_32_bytes_long!!";
        let token = create_jwt("user-123", key).unwrap();

        let claims = verify_jwt(&token, key).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_key_is_invalid_token() {
        let token = create_jwt("user-123", b"key_one_32_bytes_long_padding!!!").unwrap();
        let err = verify_jwt(&token, b"key_two_32_bytes_long_padding!!!").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_can_access() {
        let owner = AuthUser {
            user_id: "a".to_string(),
            is_admin: false,
        };
        let admin = AuthUser {
            user_id: "z".to_string(),
            is_admin: true,
        };
        assert!(owner.can_access("a"));
        assert!(!owner.can_access("b"));
        assert!(admin.can_access("b"));
    }
}
