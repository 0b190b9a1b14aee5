// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order routes.

use super::ApiJson;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Order, OrderView};
use crate::pagination::{Page, PageQuery};
use crate::services::orders::{CreateOrderRequest, UpdateStatusRequest};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Routes for any signed-in user. Status updates and per-restaurant
/// listings check for admin after confirming the target exists.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/myorders", get(my_orders))
        .route("/api/orders/{id}", get(get_order).put(update_status))
        .route(
            "/api/orders/restaurant/{restaurant_id}",
            get(restaurant_orders),
        )
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/orders", get(all_orders))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders.create(&user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    Ok(Json(state.orders.get(&id, &user).await?))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders.update_status(&id, &user, req).await?))
}

async fn my_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<OrderView>>> {
    Ok(Json(state.orders.list_mine(&user.user_id).await?))
}

async fn all_orders(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<OrderView>>> {
    Ok(Json(state.orders.list_all(page.page()).await?))
}

async fn restaurant_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(restaurant_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<OrderView>>> {
    let orders = state
        .orders
        .list_for_restaurant(&restaurant_id, &user, page.page())
        .await?;
    Ok(Json(orders))
}
