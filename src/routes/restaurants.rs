// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Restaurant catalog routes.

use super::{ApiJson, MessageResponse};
use crate::error::Result;
use crate::models::Restaurant;
use crate::pagination::{Page, PageQuery};
use crate::services::catalog::{
    CreateRestaurantRequest, MenuItemRequest, RestaurantFilter, UpdateMenuItemRequest,
    UpdateRestaurantRequest,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/restaurants", get(list_restaurants))
        .route("/api/restaurants/{id}", get(get_restaurant))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/restaurants", post(create_restaurant))
        .route(
            "/api/restaurants/{id}",
            put(update_restaurant).delete(delete_restaurant),
        )
        .route("/api/restaurants/{id}/menu", post(add_menu_item))
        .route(
            "/api/restaurants/{id}/menu/{item_id}",
            put(update_menu_item).delete(delete_menu_item),
        )
}

async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RestaurantFilter>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Restaurant>>> {
    let restaurants = state.catalog.list(&filter, page.page()).await?;
    Ok(Json(restaurants))
}

async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>> {
    Ok(Json(state.catalog.get(&id).await?))
}

async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<Restaurant>)> {
    let restaurant = state.catalog.create(req).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn update_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateRestaurantRequest>,
) -> Result<Json<Restaurant>> {
    Ok(Json(state.catalog.update(&id, req).await?))
}

async fn delete_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.catalog.delete(&id).await?;
    Ok(Json(MessageResponse::new("Restaurant removed")))
}

async fn add_menu_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MenuItemRequest>,
) -> Result<(StatusCode, Json<Restaurant>)> {
    let restaurant = state.catalog.add_menu_item(&id, req).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn update_menu_item(
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(String, String)>,
    ApiJson(req): ApiJson<UpdateMenuItemRequest>,
) -> Result<Json<Restaurant>> {
    Ok(Json(state.catalog.update_menu_item(&id, &item_id, req).await?))
}

async fn delete_menu_item(
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<Restaurant>> {
    Ok(Json(state.catalog.delete_menu_item(&id, &item_id).await?))
}
