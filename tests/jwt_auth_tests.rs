// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! These tests pin the token format so that tokens issued at login keep
//! decoding in the middleware.

use food_order_api::error::AppError;
use food_order_api::middleware::auth::{create_jwt, verify_jwt, SESSION_TTL_SECS};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

/// Claims structure the middleware expects.
#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn sign(claims: &Claims, algorithm: Algorithm) -> String {
    encode(
        &Header::new(algorithm),
        claims,
        &EncodingKey::from_secret(KEY),
    )
    .expect("Failed to create JWT")
}

#[test]
fn test_issued_token_lasts_thirty_days() {
    let token = create_jwt("user-1", KEY).unwrap();
    let claims = verify_jwt(&token, KEY).unwrap();

    assert_eq!(claims.sub, "user-1");
    assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS);
    assert_eq!(SESSION_TTL_SECS, 30 * 24 * 60 * 60);
}

#[test]
fn test_externally_signed_token_accepted() {
    let iat = now();
    let token = sign(
        &Claims {
            sub: "user-2".to_string(),
            exp: iat + 3600,
            iat,
        },
        Algorithm::HS256,
    );

    assert_eq!(verify_jwt(&token, KEY).unwrap().sub, "user-2");
}

#[test]
fn test_expired_token_rejected() {
    let iat = now() - 2 * 86400;
    let token = sign(
        &Claims {
            sub: "user-3".to_string(),
            exp: iat + 3600,
            iat,
        },
        Algorithm::HS256,
    );

    assert!(matches!(
        verify_jwt(&token, KEY),
        Err(AppError::InvalidToken)
    ));
}

#[test]
fn test_other_algorithm_rejected() {
    let iat = now();
    let token = sign(
        &Claims {
            sub: "user-4".to_string(),
            exp: iat + 3600,
            iat,
        },
        Algorithm::HS512,
    );

    assert!(verify_jwt(&token, KEY).is_err());
}
