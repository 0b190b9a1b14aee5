// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Review routes.

use super::{ApiJson, MessageResponse};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Review, ReviewView};
use crate::pagination::{Page, PageQuery};
use crate::services::reviews::{CreateReviewRequest, ReplyRequest, UpdateReviewRequest};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/reviews/restaurant/{restaurant_id}",
        get(restaurant_reviews),
    )
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reviews", post(create_review))
        .route("/api/reviews/{id}", put(update_review).delete(delete_review))
        .route("/api/reviews/{id}/like", put(toggle_like))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/reviews/{id}/reply", post(reply_to_review))
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state.reviews.create(&user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateReviewRequest>,
) -> Result<Json<Review>> {
    Ok(Json(state.reviews.update(&id, &user, req).await?))
}

async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.reviews.delete(&id, &user).await?;
    Ok(Json(MessageResponse::new("Review removed")))
}

async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Review>> {
    Ok(Json(state.reviews.toggle_like(&id, &user).await?))
}

async fn reply_to_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ReplyRequest>,
) -> Result<Json<Review>> {
    Ok(Json(state.reviews.reply(&id, req).await?))
}

async fn restaurant_reviews(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<ReviewView>>> {
    let reviews = state
        .reviews
        .list_for_restaurant(&restaurant_id, page.page())
        .await?;
    Ok(Json(reviews))
}
