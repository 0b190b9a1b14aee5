// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User accounts: registration, login, profile and favorites.

use crate::config::Config;
use crate::db::{collections, Direction, FirestoreDb, Query};
use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::patch::{overwrite_if_truthy, overwrite_opt_if_truthy};
use crate::models::{new_id, Address, Restaurant, User};
use crate::time_utils::now_rfc3339;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Deserialize;
use validator::{Validate, ValidateEmail};

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile changes; empty values leave the stored field alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub password: Option<String>,
}

/// Account management backed by the `users` collection.
#[derive(Clone)]
pub struct UserService {
    db: FirestoreDb,
    config: Config,
}

impl UserService {
    pub fn new(db: FirestoreDb, config: Config) -> Self {
        Self { db, config }
    }

    /// Sign a session token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<String> {
        Ok(create_jwt(&user.id, &self.config.jwt_signing_key)?)
    }

    /// Create an account. Emails listed in `ADMIN_EMAILS` become admins.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        req.validate()?;

        let email = normalize_email(&req.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest("User already exists".to_string()));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: req.name,
            is_admin: self.config.is_admin_email(&email),
            email,
            password_hash: hash_password(&req.password)?,
            phone: req.phone,
            address: req.address,
            favorites: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.set(collections::USERS, &user.id, &user).await?;
        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User registered");

        Ok(user)
    }

    /// Check credentials. Unknown email and wrong password are indistinguishable.
    pub async fn login(&self, req: LoginRequest) -> Result<User> {
        let invalid = || AppError::Unauthorized(INVALID_CREDENTIALS.to_string());

        let user = self
            .find_by_email(&normalize_email(&req.email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&req.password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(invalid());
        }

        Ok(user)
    }

    pub async fn profile(&self, user_id: &str) -> Result<User> {
        self.db
            .get(collections::USERS, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(&self, user_id: &str, req: UpdateProfileRequest) -> Result<User> {
        let mut user = self.profile(user_id).await?;

        let email = req
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty() && *e != user.email);
        if let Some(email) = email {
            if !email.validate_email() {
                return Err(AppError::BadRequest("Please provide a valid email".to_string()));
            }
            if self.find_by_email(&email).await?.is_some() {
                return Err(AppError::BadRequest("Email already in use".to_string()));
            }
            user.email = email;
        }

        if let Some(password) = req.password.filter(|p| !p.is_empty()) {
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AppError::BadRequest(
                    "Password must be at least 8 characters".to_string(),
                ));
            }
            user.password_hash = hash_password(&password)?;
        }

        overwrite_if_truthy(&mut user.name, req.name);
        overwrite_if_truthy(&mut user.phone, req.phone);
        overwrite_opt_if_truthy(&mut user.address, req.address);
        user.updated_at = now_rfc3339();

        self.db.set(collections::USERS, &user.id, &user).await?;
        tracing::info!(user_id = %user.id, "Profile updated");

        Ok(user)
    }

    /// All accounts, oldest first.
    pub async fn list(&self) -> Result<Vec<User>> {
        self.db
            .query(
                collections::USERS,
                &Query::new().order_by("createdAt", Direction::Ascending),
            )
            .await
    }

    pub async fn delete(&self, user_id: &str) -> Result<()> {
        let user = self.profile(user_id).await?;
        self.db.delete(collections::USERS, &user.id).await?;
        tracing::info!(user_id = %user.id, "User removed");
        Ok(())
    }

    /// Add a restaurant to the caller's favorites. Adding twice is a no-op.
    pub async fn add_favorite(&self, user_id: &str, restaurant_id: &str) -> Result<Vec<String>> {
        let restaurant: Option<Restaurant> =
            self.db.get(collections::RESTAURANTS, restaurant_id).await?;
        if restaurant.is_none() {
            return Err(AppError::NotFound("Restaurant not found".to_string()));
        }

        let mut user = self.profile(user_id).await?;
        if !user.favorites.iter().any(|id| id == restaurant_id) {
            user.favorites.push(restaurant_id.to_string());
            user.updated_at = now_rfc3339();
            self.db.set(collections::USERS, &user.id, &user).await?;
        }

        Ok(user.favorites)
    }

    pub async fn remove_favorite(
        &self,
        user_id: &str,
        restaurant_id: &str,
    ) -> Result<Vec<String>> {
        let mut user = self.profile(user_id).await?;
        let before = user.favorites.len();
        user.favorites.retain(|id| id != restaurant_id);

        if user.favorites.len() != before {
            user.updated_at = now_rfc3339();
            self.db.set(collections::USERS, &user.id, &user).await?;
        }

        Ok(user.favorites)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut users: Vec<User> = self
            .db
            .query(collections::USERS, &Query::new().eq("email", email).limit(1))
            .await?;
        Ok(users.pop())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
