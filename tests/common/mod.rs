// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use food_order_api::config::Config;
use food_order_api::db::{collections, FirestoreDb};
use food_order_api::middleware::auth::create_jwt;
use food_order_api::models::{
    new_id, Order, OrderItem, OrderStatus, Restaurant, ShippingAddress, User,
};
use food_order_api::routes::create_router;
use food_order_api::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app on the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState::new(config, FirestoreDb::new_in_memory()));
    (create_router(state.clone()), state)
}

/// Session token for `user_id` signed with the test key.
#[allow(dead_code)]
pub fn token_for(state: &AppState, user_id: &str) -> String {
    create_jwt(user_id, &state.config.jwt_signing_key).unwrap()
}

/// Fixed timestamp `n` seconds into 2024; larger `n` is newer.
#[allow(dead_code)]
pub fn ts(n: u32) -> String {
    format!(
        "2024-01-01T{:02}:{:02}:{:02}.000000Z",
        n / 3600,
        (n / 60) % 60,
        n % 60
    )
}

/// Store a user directly and return it with a session token.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, name: &str, is_admin: bool) -> (User, String) {
    let id = new_id();
    let user = User {
        id: id.clone(),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        password_hash: "unused".to_string(),
        phone: "555-0100".to_string(),
        address: None,
        is_admin,
        favorites: vec![],
        created_at: ts(0),
        updated_at: ts(0),
    };
    state
        .db
        .set(collections::USERS, &user.id, &user)
        .await
        .unwrap();

    let token = token_for(state, &user.id);
    (user, token)
}

#[allow(dead_code)]
pub async fn seed_restaurant(
    state: &AppState,
    name: &str,
    cuisine: &[&str],
    rating: f64,
) -> Restaurant {
    let restaurant = Restaurant {
        id: new_id(),
        name: name.to_string(),
        description: None,
        cuisine: cuisine.iter().map(|c| c.to_string()).collect(),
        address: None,
        phone: None,
        email: None,
        opening_hours: None,
        rating,
        num_reviews: 0,
        delivery_time: None,
        minimum_order: None,
        delivery_fee: Some(2.5),
        images: vec![],
        menu: vec![],
        is_active: true,
        created_at: ts(0),
        updated_at: ts(0),
    };
    state
        .db
        .set(collections::RESTAURANTS, &restaurant.id, &restaurant)
        .await
        .unwrap();
    restaurant
}

#[allow(dead_code)]
pub async fn seed_order(
    state: &AppState,
    user_id: &str,
    restaurant_id: &str,
    created_at: String,
) -> Order {
    let order = Order {
        id: new_id(),
        user: user_id.to_string(),
        restaurant: restaurant_id.to_string(),
        order_items: vec![OrderItem {
            name: "Pad Thai".to_string(),
            qty: 2,
            price: 11.0,
            item: new_id(),
        }],
        shipping_address: test_address(),
        payment_method: "cash".to_string(),
        payment_result: None,
        items_price: 22.0,
        delivery_fee: 2.5,
        total_price: 24.5,
        status: OrderStatus::Pending,
        delivered_at: None,
        rider: None,
        special_instructions: None,
        created_at: created_at.clone(),
        updated_at: created_at,
    };
    state
        .db
        .set(collections::ORDERS, &order.id, &order)
        .await
        .unwrap();
    order
}

#[allow(dead_code)]
pub fn test_address() -> ShippingAddress {
    ShippingAddress {
        street: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        area: "Downtown".to_string(),
        postal_code: None,
        phone: "555-0100".to_string(),
    }
}

/// Send one request through the router and decode the JSON body
/// (`Value::Null` when the body is empty).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
