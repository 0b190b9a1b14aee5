// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, login, profile, favorites.

use super::{ApiJson, MessageResponse};
use crate::error::Result;
use crate::middleware::auth::{AuthUser, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::models::{User, UserProfile};
use crate::services::users::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/logout", post(logout))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/profile", get(get_profile).put(update_profile))
        .route(
            "/api/users/favorites/{restaurant_id}",
            post(add_favorite).delete(remove_favorite),
        )
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", delete(delete_user))
}

/// Profile plus a fresh session token.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

/// Build the session response: JSON body plus the `food_token` cookie.
fn session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let token = state.users.issue_token(user)?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .http_only(true)
        .secure(!state.config.frontend_url.starts_with("http://"))
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            profile: UserProfile::from(user),
            token,
        }),
    ))
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let user = state.users.register(req).await?;
    let (jar, body) = session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, body))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = state.users.login(req).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    session(&state, jar, &user)
}

/// Clear the session cookie. Bearer tokens stay valid until they expire.
async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Json(MessageResponse::new("Logged out")))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state.users.profile(&user.user_id).await?;
    Ok(Json(UserProfile::from(&profile)))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let updated = state.users.update_profile(&user.user_id, req).await?;
    session(&state, jar, &updated)
}

async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<FavoritesResponse>> {
    let favorites = state
        .users
        .add_favorite(&user.user_id, &restaurant_id)
        .await?;
    Ok(Json(FavoritesResponse { favorites }))
}

async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<FavoritesResponse>> {
    let favorites = state
        .users
        .remove_favorite(&user.user_id, &restaurant_id)
        .await?;
    Ok(Json(FavoritesResponse { favorites }))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserProfile>>> {
    let users = state.users.list().await?;
    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    tracing::info!(admin_id = %admin.user_id, user_id = %id, "Admin deleting user");
    state.users.delete(&id).await?;
    Ok(Json(MessageResponse::new("User removed")))
}
